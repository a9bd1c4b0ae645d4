//! Player Identity
//!
//! Works out who is submitting a score. With `AUTH_SECRET` set, the caller
//! must present an HS256 bearer token signed by the hosting platform (the
//! server never issues tokens). Without it, the server trusts an `X-Username`
//! header set by the fronting platform.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest username accepted.
pub const MAX_USERNAME_LEN: usize = 64;

/// Identity configuration.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// HS256 secret; `None` falls back to the username header.
    pub secret: Option<String>,
    /// Accept expired tokens (local testing only).
    pub skip_expiry: bool,
}

impl AuthConfig {
    /// Read `AUTH_SECRET` and `AUTH_SKIP_EXPIRY`.
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("AUTH_SECRET").ok().filter(|s| !s.is_empty()),
            skip_expiry: std::env::var("AUTH_SKIP_EXPIRY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Whether bearer tokens are required.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

/// Claims read from a platform token. Unknown claims are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Platform user id.
    #[serde(default)]
    pub sub: String,
    /// Display name, when the platform sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Expiry (Unix seconds).
    #[serde(default)]
    pub exp: u64,
}

impl TokenClaims {
    /// Leaderboard name: `preferred_username` if present, else the subject.
    pub fn username(&self) -> &str {
        self.preferred_username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.sub)
    }
}

/// Identity errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A token was presented but no secret is configured.
    #[error("token authentication not configured")]
    NotConfigured,
    /// Neither a bearer token nor a username header was supplied.
    #[error("missing player identity")]
    MissingIdentity,
    /// Username empty, too long or containing control characters.
    #[error("invalid username")]
    InvalidUsername,
    /// Token past its `exp`.
    #[error("token expired")]
    Expired,
    /// Bad signature, malformed token or missing `exp`.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Check a token's signature and expiry and return its claims.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    let secret = config.secret.as_deref().ok_or(AuthError::NotConfigured)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    if config.skip_expiry {
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
    }

    decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(e.to_string()),
        })
}

/// Resolve the submitting player's name.
///
/// `authorization` is the raw `Authorization` header, `username_header` the
/// raw `X-Username` header. When a secret is configured only a bearer token
/// is accepted.
pub fn resolve_username(
    authorization: Option<&str>,
    username_header: Option<&str>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let name = if config.is_configured() {
        let token = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AuthError::MissingIdentity)?;
        validate_token(token, config)?.username().to_string()
    } else {
        username_header
            .map(str::to_string)
            .ok_or(AuthError::MissingIdentity)?
    };

    normalize_username(&name)
}

fn normalize_username(raw: &str) -> Result<String, AuthError> {
    let name = raw.trim();
    if name.is_empty()
        || name.chars().count() > MAX_USERNAME_LEN
        || name.chars().any(char::is_control)
    {
        return Err(AuthError::InvalidUsername);
    }
    Ok(name.to_string())
}
