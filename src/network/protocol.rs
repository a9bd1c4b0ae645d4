//! Protocol Messages
//!
//! JSON bodies of the HTTP API. Field names are camelCase on the wire.

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

use crate::game::difficulty::Difficulty;
use crate::game::leaderboard::{LeaderboardEntry, SubmitOutcome};
use crate::game::session::PlaySession;

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

/// `POST /api/submit-score` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    /// Solve time in seconds.
    pub time: u32,
    /// Slides taken.
    pub moves: u32,
    /// Board size (3, 4 or 5).
    pub difficulty: Difficulty,
    /// Tile indices slid, for server-side replay. Optional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_log: Option<Vec<usize>>,
}

impl SubmitScoreRequest {
    /// Parse a request body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Build the body for a solved session (with its move log).
    pub fn from_session(session: &PlaySession) -> Option<Self> {
        let completion = session.completion()?;
        Some(Self {
            time: completion.time,
            moves: completion.moves,
            difficulty: session.difficulty(),
            move_log: Some(session.move_log().to_vec()),
        })
    }
}

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// `POST /api/submit-score` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScoreResponse {
    /// Always `"success"`.
    pub status: String,
    /// 1-based rank, `null` when outside the table.
    pub rank: Option<usize>,
    /// Human-readable summary.
    pub message: String,
}

impl SubmitScoreResponse {
    /// Build the response for a ranking outcome.
    pub fn new(rank: Option<usize>, outcome: SubmitOutcome) -> Self {
        let message = match (rank, outcome) {
            (Some(rank), SubmitOutcome::Retained) => {
                format!("Your previous best is still better. You remain at #{}", rank)
            }
            (Some(rank), SubmitOutcome::Improved) => {
                format!("New personal best! You are now ranked #{}", rank)
            }
            (Some(rank), SubmitOutcome::Inserted) => {
                format!("Score submitted! You are ranked #{}", rank)
            }
            (None, _) => "Score submitted, but it is outside the top 100".to_string(),
        };

        Self {
            status: "success".to_string(),
            rank,
            message,
        }
    }
}

/// `GET /api/leaderboard` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    /// Entries in rank order.
    pub entries: Vec<LeaderboardEntry>,
    /// Day queried.
    pub date: NaiveDate,
    /// Board size queried.
    pub difficulty: Difficulty,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// What went wrong.
    pub message: String,
}

impl ErrorResponse {
    /// Build an error body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}
