//! Route Dispatch
//!
//! Axum routes over [`PuzzleService`]. Every failure becomes an
//! `{status:"error", message}` body with the status from [`ApiError`].

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json,
};
use chrono::{NaiveDate, Utc};
use tracing::{error, warn};

use crate::game::daily::DailyState;
use crate::game::difficulty::Difficulty;
use crate::network::auth::{resolve_username, AuthConfig};
use crate::network::protocol::{
    ErrorResponse, HealthResponse, LeaderboardResponse, SubmitScoreRequest, SubmitScoreResponse,
};
use crate::network::service::{ApiError, PuzzleService, ScoreSubmission};
use crate::store::KvStore;

/// Header carrying the platform-supplied username when JWTs are off.
pub const USERNAME_HEADER: &str = "x-username";

/// Handler state.
pub struct AppState<S: KvStore> {
    service: Arc<PuzzleService<S>>,
    auth: Arc<AuthConfig>,
}

impl<S: KvStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            auth: self.auth.clone(),
        }
    }
}

/// Build the API routes.
pub fn api_router<S: KvStore>(service: Arc<PuzzleService<S>>, auth: AuthConfig) -> axum::Router {
    let state = AppState {
        service,
        auth: Arc::new(auth),
    };

    axum::Router::new()
        .route("/api/daily-state", get(daily_state::<S>).fallback(method_not_allowed))
        .route("/api/submit-score", post(submit_score::<S>).fallback(method_not_allowed))
        .route("/api/leaderboard", get(leaderboard::<S>).fallback(method_not_allowed))
        .route("/api/health", get(health).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

async fn daily_state<S: KvStore>(State(app): State<AppState<S>>) -> Result<Json<DailyState>, ApiError> {
    Ok(Json(app.service.current_daily_state().await?))
}

async fn submit_score<S: KvStore>(
    State(app): State<AppState<S>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitScoreResponse>, ApiError> {
    let username = resolve_username(
        header_str(&headers, AUTHORIZATION.as_str()),
        header_str(&headers, USERNAME_HEADER),
        &app.auth,
    )?;
    let request = SubmitScoreRequest::from_json(&body)
        .map_err(|e| ApiError::InvalidSubmission(e.to_string()))?;

    let receipt = app
        .service
        .submit_score(ScoreSubmission { username, request })
        .await?;
    Ok(Json(SubmitScoreResponse::new(receipt.rank, receipt.outcome)))
}

async fn leaderboard<S: KvStore>(
    State(app): State<AppState<S>>,
    RawQuery(query): RawQuery,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let params = LeaderboardQuery::parse(query.as_deref().unwrap_or_default());

    let difficulty = match params.difficulty.as_deref() {
        Some(raw) => raw
            .parse::<Difficulty>()
            .map_err(|e| ApiError::InvalidQuery(e.to_string()))?,
        None => Difficulty::default(),
    };

    let date = match params.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::InvalidQuery(format!("invalid date: {}", raw)))?,
        // Before the first daily job there is no current date; use UTC today
        None => match app.service.current_daily_state().await {
            Ok(state) => state.date,
            Err(ApiError::NotReady) => Utc::now().date_naive(),
            Err(e) => return Err(e),
        },
    };

    let table = app.service.leaderboard(date, difficulty).await?;
    Ok(Json(LeaderboardResponse {
        entries: table.into_entries(),
        date,
        difficulty,
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// `GET /api/leaderboard` parameters; empty values count as absent.
#[derive(Debug, Default, PartialEq, Eq)]
struct LeaderboardQuery {
    date: Option<String>,
    difficulty: Option<String>,
}

impl LeaderboardQuery {
    fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "date" => params.date = value,
                "difficulty" => params.difficulty = value,
                _ => {}
            }
        }
        params
    }
}
