//! Game Logic
//!
//! The puzzle engine and everything derived from it. Pure and synchronous
//! except for the session timer, which needs a tokio runtime.

pub mod daily;
pub mod difficulty;
pub mod leaderboard;
pub mod puzzle;
pub mod replay;
pub mod session;
pub mod timer;

pub use daily::{DailyState, ImagePool, ImageRef, ImageSource};
pub use difficulty::Difficulty;
pub use leaderboard::{LeaderboardEntry, LeaderboardTable, SubmitOutcome, SubmitReceipt};
pub use puzzle::{create_shuffled_puzzle, is_solvable, shuffle_with_attempts, MoveError, PuzzleState};
pub use replay::{verify_solution, ReplayError};
pub use session::{PlaySession, SlideOutcome};
