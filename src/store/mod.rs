//! Score Store
//!
//! The key-value store the service persists through. It is an external
//! collaborator: the service only needs `get` and `set` of strings, so any
//! backend that offers those can sit behind [`KvStore`].

pub mod file;
pub mod keys;
pub mod memory;

use std::future::Future;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Store failures. Never retried by the service.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Local persistence failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be decoded.
    #[error("corrupt value under {key}: {source}")]
    Corrupt {
        /// Key whose value failed to decode.
        key: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store.
///
/// No compare-and-swap is assumed; callers serialize their own
/// read-modify-write sequences.
pub trait KvStore: Send + Sync + 'static {
    /// Fetch a value, `None` if the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Fetch and decode a JSON value.
pub async fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KvStore,
    T: serde::de::DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key: key.to_string(), source }),
        None => Ok(None),
    }
}

/// Encode and write a JSON value.
pub async fn set_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KvStore,
    T: serde::Serialize,
{
    let raw = serde_json::to_string(value)
        .map_err(|source| StoreError::Corrupt { key: key.to_string(), source })?;
    store.set(key, raw).await
}
