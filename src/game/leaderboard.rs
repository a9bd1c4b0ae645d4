//! Leaderboard Ranking
//!
//! One table per (date, difficulty): best score per player, sorted by
//! `(time, moves)` ascending, capped at [`LEADERBOARD_CAPACITY`].

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

use crate::game::difficulty::Difficulty;

/// Entries kept per table.
pub const LEADERBOARD_CAPACITY: usize = 100;

/// A player's best solve for one day and difficulty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name.
    pub username: String,
    /// Solve time in seconds.
    pub time: u32,
    /// Number of slides.
    pub moves: u32,
    /// Board size.
    pub difficulty: Difficulty,
    /// Puzzle day.
    pub date: NaiveDate,
}

impl LeaderboardEntry {
    /// Ordering key: time first, moves break ties.
    #[inline]
    pub fn score_key(&self) -> (u32, u32) {
        (self.time, self.moves)
    }

    /// Strictly better than `other` under the ranking order.
    #[inline]
    pub fn beats(&self, other: &LeaderboardEntry) -> bool {
        self.score_key() < other.score_key()
    }
}

/// What a submission did to the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// First score for this player.
    Inserted,
    /// Replaced a worse score.
    Improved,
    /// Existing score was as good or better; table unchanged.
    Retained,
}

impl SubmitOutcome {
    /// Whether the table needs persisting.
    pub fn changed_table(self) -> bool {
        !matches!(self, SubmitOutcome::Retained)
    }
}

/// Result of [`LeaderboardTable::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// 1-based rank, `None` when the score fell outside the table.
    pub rank: Option<usize>,
    /// Effect on the table.
    pub outcome: SubmitOutcome,
}

/// Ordered leaderboard for one (date, difficulty).
///
/// Persisted as a bare JSON array of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderboardTable {
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in rank order.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Consume into the entry list.
    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based position of `username`, if present.
    pub fn rank_of(&self, username: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.username == username)
            .map(|i| i + 1)
    }

    /// Record a score.
    ///
    /// A player keeps one entry; a resubmission only replaces it when
    /// strictly better. A retained submission reports the existing entry's
    /// rank (1 + entries strictly ahead of it).
    pub fn submit(&mut self, entry: LeaderboardEntry) -> SubmitReceipt {
        let outcome = match self.entries.iter().position(|e| e.username == entry.username) {
            Some(idx) => {
                let existing = &self.entries[idx];
                if !entry.beats(existing) {
                    let ahead = self.entries.iter().filter(|e| e.beats(existing)).count();
                    return SubmitReceipt {
                        rank: Some(ahead + 1),
                        outcome: SubmitOutcome::Retained,
                    };
                }
                self.entries[idx] = entry.clone();
                SubmitOutcome::Improved
            }
            None => {
                self.entries.push(entry.clone());
                SubmitOutcome::Inserted
            }
        };

        // Stable sort: equal scores keep submission order
        self.entries.sort_by_key(LeaderboardEntry::score_key);
        self.entries.truncate(LEADERBOARD_CAPACITY);

        SubmitReceipt {
            rank: self.rank_of(&entry.username),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn entry(username: &str, time: u32, moves: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            username: username.to_string(),
            time,
            moves,
            difficulty: Difficulty::Medium,
            date: day(),
        }
    }

    #[test]
    fn test_first_submission_inserted() {
        let mut table = LeaderboardTable::new();
        let receipt = table.submit(entry("alice", 90, 30));

        assert_eq!(receipt.outcome, SubmitOutcome::Inserted);
        assert_eq!(receipt.rank, Some(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_faster_resubmission_replaces() {
        let mut table = LeaderboardTable::new();
        table.submit(entry("bob", 110, 20));
        table.submit(entry("alice", 120, 40));
        table.submit(entry("carol", 95, 60));

        let receipt = table.submit(entry("alice", 100, 50));
        assert_eq!(receipt.outcome, SubmitOutcome::Improved);
        // carol 95 < alice 100 < bob 110
        assert_eq!(receipt.rank, Some(2));
        assert_eq!(table.len(), 3);

        let alice = &table.entries()[1];
        assert_eq!((alice.time, alice.moves), (100, 50));
    }

    #[test]
    fn test_worse_resubmission_retained_with_existing_rank() {
        let mut table = LeaderboardTable::new();
        table.submit(entry("alice", 100, 5));
        table.submit(entry("bob", 90, 30));
        table.submit(entry("carol", 140, 12));

        let before = table.clone();
        let receipt = table.submit(entry("alice", 150, 10));

        assert_eq!(receipt.outcome, SubmitOutcome::Retained);
        assert_eq!(receipt.rank, Some(2));
        assert_eq!(table, before);
    }

    #[test]
    fn test_equal_score_is_not_an_improvement() {
        let mut table = LeaderboardTable::new();
        table.submit(entry("alice", 100, 20));
        let receipt = table.submit(entry("alice", 100, 20));
        assert_eq!(receipt.outcome, SubmitOutcome::Retained);
    }

    #[test]
    fn test_moves_break_time_ties() {
        let mut table = LeaderboardTable::new();
        table.submit(entry("alice", 100, 40));
        let receipt = table.submit(entry("bob", 100, 35));
        assert_eq!(receipt.rank, Some(1));

        // Same time, fewer moves counts as an improvement
        let receipt = table.submit(entry("alice", 100, 30));
        assert_eq!(receipt.outcome, SubmitOutcome::Improved);
        assert_eq!(receipt.rank, Some(1));
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let mut table = LeaderboardTable::new();
        table.submit(entry("alice", 100, 20));
        let receipt = table.submit(entry("bob", 100, 20));
        assert_eq!(receipt.rank, Some(2));
    }

    #[test]
    fn test_truncates_to_capacity_keeping_best() {
        let mut table = LeaderboardTable::new();
        for i in 0..LEADERBOARD_CAPACITY as u32 {
            table.submit(entry(&format!("player{i}"), 200 + i, 10));
        }
        assert_eq!(table.len(), LEADERBOARD_CAPACITY);

        let receipt = table.submit(entry("fast", 50, 10));
        assert_eq!(receipt.rank, Some(1));
        assert_eq!(table.len(), LEADERBOARD_CAPACITY);

        // The previous worst entry was pushed out
        let worst = format!("player{}", LEADERBOARD_CAPACITY - 1);
        assert_eq!(table.rank_of(&worst), None);
        assert!(table.entries().windows(2).all(|w| w[0].score_key() <= w[1].score_key()));
    }

    #[test]
    fn test_truncated_out_is_unranked() {
        let mut table = LeaderboardTable::new();
        for i in 0..LEADERBOARD_CAPACITY as u32 {
            table.submit(entry(&format!("player{i}"), 10 + i, 10));
        }

        let receipt = table.submit(entry("slow", 9999, 999));
        assert_eq!(receipt.outcome, SubmitOutcome::Inserted);
        assert_eq!(receipt.rank, None);
        assert_eq!(table.len(), LEADERBOARD_CAPACITY);
        assert_eq!(table.rank_of("slow"), None);
    }

    #[test]
    fn test_persisted_form_is_array() {
        let mut table = LeaderboardTable::new();
        table.submit(entry("alice", 100, 20));

        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"date\":\"2026-10-19\""));
        assert!(json.contains("\"difficulty\":4"));

        let parsed: LeaderboardTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
