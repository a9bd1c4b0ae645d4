//! # Daily Slide Server
//!
//! Backend for a once-a-day sliding-tile puzzle: every player gets the same
//! shuffled board for the day and competes on a per-difficulty leaderboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DAILY SLIDE SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - 32-bit LCG and daily seed derivation      │
//! │                                                              │
//! │  game/           - Puzzle rules (deterministic)              │
//! │  ├── puzzle.rs   - Shuffle, moves, solved check, hints       │
//! │  ├── replay.rs   - Move-log verification                     │
//! │  ├── leaderboard.rs - Ranked table per day and difficulty    │
//! │  ├── daily.rs    - Daily state and image rotation            │
//! │  └── session.rs  - Client play session and timer             │
//! │                                                              │
//! │  store/          - Key-value persistence                     │
//! │                                                              │
//! │  network/        - HTTP API (non-deterministic)              │
//! │  ├── service.rs  - Submission, leaderboard, daily job        │
//! │  ├── router.rs   - Route dispatch                            │
//! │  └── server.rs   - Accept loop                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given a seed and a difficulty, [`create_shuffled_puzzle`] produces the
//! same board on every platform. The server never stores boards, only seeds;
//! a submitted move log is checked by rebuilding the board from the seed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use core::rng::{SeededRng, derive_daily_seed};
pub use game::difficulty::Difficulty;
pub use game::puzzle::{create_shuffled_puzzle, PuzzleState};
pub use game::leaderboard::{LeaderboardEntry, LeaderboardTable};
pub use game::daily::DailyState;
pub use store::KvStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
