//! Core deterministic primitives.
//!
//! Everything here must produce bit-identical results on every platform:
//! the daily board is derived independently by the server and by each client.

pub mod rng;

// Re-export core types
pub use rng::{SeededRng, derive_daily_seed};
