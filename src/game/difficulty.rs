//! Puzzle Difficulty
//!
//! The closed set of board sizes. Anything outside {3, 4, 5} is rejected at
//! the boundary, so the engine never sees an unsupported size.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Board edge length: 3x3, 4x4 or 5x5.
///
/// Serialized as the bare integer (`3`, `4`, `5`) on the wire and in store keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Difficulty {
    /// 3x3, 8 tiles
    #[default]
    Easy = 3,
    /// 4x4, 15 tiles
    Medium = 4,
    /// 5x5, 24 tiles
    Hard = 5,
}

/// Rejected difficulty value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("difficulty must be 3, 4 or 5 (got {0})")]
pub struct InvalidDifficulty(pub String);

impl Difficulty {
    /// All difficulties, smallest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Edge length of the board.
    #[inline]
    pub fn size(self) -> usize {
        self as usize
    }

    /// Number of cells (tiles plus the empty cell).
    #[inline]
    pub fn cell_count(self) -> usize {
        self.size() * self.size()
    }

    /// Get difficulty from its edge length.
    pub fn from_size(size: u8) -> Option<Difficulty> {
        match size {
            3 => Some(Difficulty::Easy),
            4 => Some(Difficulty::Medium),
            5 => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = InvalidDifficulty;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Difficulty::from_size(value).ok_or_else(|| InvalidDifficulty(value.to_string()))
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value as u8
    }
}

impl FromStr for Difficulty {
    type Err = InvalidDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Difficulty::from_size)
            .ok_or_else(|| InvalidDifficulty(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
