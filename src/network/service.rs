//! Puzzle Service
//!
//! The operations behind the HTTP routes: daily-state lookup, score
//! submission and leaderboard queries, plus the daily job that publishes each
//! day's state. Transport-agnostic; the router turns these results into
//! responses.

use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn, instrument};

use crate::game::daily::{DailyState, ImageSource};
use crate::game::difficulty::Difficulty;
use crate::game::leaderboard::{LeaderboardEntry, LeaderboardTable, SubmitReceipt};
use crate::game::replay::{verify_claim, ReplayError};
use crate::network::auth::AuthError;
use crate::network::protocol::SubmitScoreRequest;
use crate::store::{get_json, keys, set_json, KvStore, StoreError};

/// Service errors, each mapping to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Today's daily state has not been published yet.
    #[error("today's puzzle is not ready yet")]
    NotReady,

    /// Score submission body missing or invalid.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    /// Query parameter invalid.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Move log did not check out.
    #[error("solution rejected: {0}")]
    Replay(#[from] ReplayError),

    /// Caller identity missing or invalid.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// Store read or write failed.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    /// No such route.
    #[error("not found")]
    NotFound,

    /// Route exists, method does not.
    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotReady | ApiError::NotFound => 404,
            ApiError::InvalidSubmission(_) | ApiError::InvalidQuery(_) | ApiError::Replay(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::MethodNotAllowed => 405,
            ApiError::Store(_) => 500,
        }
    }
}

/// Accepted score, ready to rank.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    /// Resolved player name.
    pub username: String,
    /// Parsed body.
    pub request: SubmitScoreRequest,
}

/// Result of a daily job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyJobOutcome {
    /// A new state was created for the day.
    Created,
    /// The day already had a state; `current` was re-pointed if needed.
    AlreadyPresent,
    /// The image source had nothing; no state could be made.
    NoImage,
}

type LockKey = (NaiveDate, Difficulty);

/// Service state shared by all connections.
pub struct PuzzleService<S: KvStore> {
    store: Arc<S>,
    images: Arc<dyn ImageSource>,
    seed_salt: String,
    /// One async lock per leaderboard key; serializes read-modify-write.
    table_locks: Mutex<BTreeMap<LockKey, Arc<Mutex<()>>>>,
}

impl<S: KvStore> PuzzleService<S> {
    /// Create a service over `store`.
    pub fn new(store: Arc<S>, images: Arc<dyn ImageSource>, seed_salt: impl Into<String>) -> Self {
        Self {
            store,
            images,
            seed_salt: seed_salt.into(),
            table_locks: Mutex::new(BTreeMap::new()),
        }
    }

    /// The newest published daily state.
    pub async fn current_daily_state(&self) -> Result<DailyState, ApiError> {
        get_json(self.store.as_ref(), keys::CURRENT_DAILY_STATE)
            .await?
            .ok_or(ApiError::NotReady)
    }

    /// The daily state for a specific day.
    pub async fn daily_state_for(&self, date: NaiveDate) -> Result<Option<DailyState>, ApiError> {
        Ok(get_json(self.store.as_ref(), &keys::daily_state(date)).await?)
    }

    /// Publish `today`'s state if missing and point `current` at it.
    ///
    /// Idempotent: a second run on the same day changes nothing.
    #[instrument(skip(self))]
    pub async fn ensure_daily_state(&self, today: NaiveDate) -> Result<DailyJobOutcome, ApiError> {
        let (state, outcome) = match self.daily_state_for(today).await? {
            Some(existing) => (existing, DailyJobOutcome::AlreadyPresent),
            None => {
                let Some(state) = DailyState::generate(today, &self.seed_salt, self.images.as_ref()) else {
                    warn!("No image available for {}, daily state not created", today);
                    return Ok(DailyJobOutcome::NoImage);
                };
                set_json(self.store.as_ref(), &keys::daily_state(today), &state).await?;
                info!(
                    "Created daily state for {} (seed {}, image {})",
                    today, state.shuffle_seed, state.image_url
                );
                (state, DailyJobOutcome::Created)
            }
        };

        let current: Option<DailyState> = get_json(self.store.as_ref(), keys::CURRENT_DAILY_STATE).await?;
        if current.as_ref() != Some(&state) {
            set_json(self.store.as_ref(), keys::CURRENT_DAILY_STATE, &state).await?;
            debug!("Pointed current daily state at {}", today);
        }

        self.prune_table_locks(today).await;
        Ok(outcome)
    }

    /// Validate and record a score against the current daily puzzle.
    ///
    /// Validation (including replay of an attached move log) happens before
    /// the leaderboard is read.
    #[instrument(skip(self, submission), fields(username = %submission.username))]
    pub async fn submit_score(&self, submission: ScoreSubmission) -> Result<SubmitReceipt, ApiError> {
        let ScoreSubmission { username, request } = submission;

        if request.moves == 0 {
            return Err(ApiError::InvalidSubmission("moves must be at least 1".into()));
        }

        let daily = self.current_daily_state().await?;

        if let Some(log) = &request.move_log {
            verify_claim(request.difficulty, daily.shuffle_seed, request.moves, log)?;
            debug!("Move log of {} moves verified", log.len());
        }

        let entry = LeaderboardEntry {
            username,
            time: request.time,
            moves: request.moves,
            difficulty: request.difficulty,
            date: daily.date,
        };

        let lock = self.table_lock(daily.date, request.difficulty).await;
        let _guard = lock.lock().await;

        let key = keys::leaderboard(daily.date, request.difficulty);
        let mut table: LeaderboardTable = get_json(self.store.as_ref(), &key).await?.unwrap_or_default();
        let receipt = table.submit(entry);

        if receipt.outcome.changed_table() {
            set_json(self.store.as_ref(), &key, &table).await?;
        }

        match receipt.rank {
            Some(rank) => info!("Score recorded on {}: {:?}, rank {}", key, receipt.outcome, rank),
            None => warn!("Score on {} fell outside the table", key),
        }
        Ok(receipt)
    }

    /// The stored table for `(date, difficulty)`, empty if none.
    pub async fn leaderboard(
        &self,
        date: NaiveDate,
        difficulty: Difficulty,
    ) -> Result<LeaderboardTable, ApiError> {
        let key = keys::leaderboard(date, difficulty);
        Ok(get_json(self.store.as_ref(), &key).await?.unwrap_or_default())
    }

    async fn table_lock(&self, date: NaiveDate, difficulty: Difficulty) -> Arc<Mutex<()>> {
        let mut locks = self.table_locks.lock().await;
        locks.entry((date, difficulty)).or_default().clone()
    }

    /// Drop locks for days before yesterday.
    async fn prune_table_locks(&self, today: NaiveDate) {
        let Some(cutoff) = today.pred_opt() else {
            return;
        };
        let mut locks = self.table_locks.lock().await;
        locks.retain(|(date, _), _| *date >= cutoff);
    }

    #[cfg(test)]
    pub(crate) async fn lock_count(&self) -> usize {
        self.table_locks.lock().await.len()
    }
}
