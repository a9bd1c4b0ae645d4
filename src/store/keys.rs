//! Store key layout.

use chrono::NaiveDate;

use crate::game::difficulty::Difficulty;

/// Pointer to the newest daily state.
pub const CURRENT_DAILY_STATE: &str = "daily_state:current";

/// `daily_state:<date>`
pub fn daily_state(date: NaiveDate) -> String {
    format!("daily_state:{}", date.format("%Y-%m-%d"))
}

/// `leaderboard:<date>:<difficulty>`
pub fn leaderboard(date: NaiveDate, difficulty: Difficulty) -> String {
    format!("leaderboard:{}:{}", date.format("%Y-%m-%d"), difficulty)
}
