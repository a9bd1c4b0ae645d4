//! Deterministic Random Number Generator
//!
//! A 32-bit linear congruential generator shared by every client of the
//! daily puzzle. Given the same seed, it produces the identical sequence on
//! all platforms, which is what makes the "one board for everyone" promise hold.

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// LCG multiplier (Numerical Recipes).
pub const LCG_MULTIPLIER: u32 = 1_664_525;

/// LCG increment (Numerical Recipes).
pub const LCG_INCREMENT: u32 = 1_013_904_223;

/// 2^32, the modulus, as a float divisor.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Seeded PRNG using a 32-bit LCG.
///
/// # Determinism Guarantee
///
/// The state update is `state = state * 1664525 + 1013904223 (mod 2^32)`
/// with wrapping arithmetic, and the output is `state / 2^32`. These constants
/// must never change: every client derives the daily board from them.
///
/// # Example
///
/// ```
/// use daily_slide::core::rng::SeededRng;
///
/// let mut rng = SeededRng::new(0);
/// rng.next_f64();
/// assert_eq!(rng.state(), 1013904223); // Always the same!
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SeededRng {
    /// Create a new RNG. The seed is the initial state as-is.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the state and return the new raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// Generate the next value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }

    /// Generate an index in `[0, bound)` as `floor(next_f64() * bound)`.
    #[inline]
    pub fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let idx = (self.next_f64() * bound as f64).floor() as usize;
        // next_f64 < 1.0, but clamp anyway against rounding at the top end
        idx.min(bound - 1)
    }

    /// Shuffle a slice in place using Fisher-Yates, last index down to 1.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_index(i + 1);
            slice.swap(i, j);
        }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }
}

/// Derive the shared shuffle seed for a calendar day.
///
/// `SHA-256("DAILY_SLIDE_SEED_V1" || salt || "YYYY-MM-DD")`, first four bytes
/// little-endian. The salt lets an operator rotate all future boards without
/// touching the date.
pub fn derive_daily_seed(date: NaiveDate, salt: &str) -> u32 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"DAILY_SLIDE_SEED_V1");
    hasher.update(salt.as_bytes());
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());

    let hash = hasher.finalize();
    u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]])
}

// =============================================================================
// TESTS
// =============================================================================
