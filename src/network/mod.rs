//! Network Layer
//!
//! JSON-over-HTTP API on axum and hyper. All puzzle and ranking rules live in
//! `game/`; this layer resolves identity, talks to the store and serves routes.

pub mod auth;
pub mod protocol;
pub mod router;
pub mod server;
pub mod service;

pub use auth::{AuthConfig, TokenClaims, AuthError, resolve_username, validate_token};
pub use protocol::{
    SubmitScoreRequest, SubmitScoreResponse, LeaderboardResponse, HealthResponse, ErrorResponse,
};
pub use router::api_router;
pub use server::{ApiServer, ServerConfig, ServerError};
pub use service::{ApiError, DailyJobOutcome, PuzzleService, ScoreSubmission};
