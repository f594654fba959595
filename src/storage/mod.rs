//! Persistent client-side key-value storage.
//!
//! # Data Flow
//! ```text
//! circuit breaker deadline ─┐
//! feature cache entries ────┼─→ KvStore (string key → JSON string)
//! story collections ────────┘       ├─ memory.rs (process lifetime)
//!                                   └─ file.rs   (JSON file, write-through)
//! ```
//!
//! # Design Decisions
//! - Reads never fail: an absent or malformed value is "no value"
//! - Writes report errors; callers decide whether a failed write matters
//! - No versioning or migration; values are plain JSON

pub mod file;
pub mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Breaker lockout deadline.
pub const LOCKOUT_KEY: &str = "nexus_circuit_lockout";
/// Feed summary cache entry.
pub const SUMMARY_CACHE_KEY: &str = "nexus_pulse_summary_cache";
/// Global echoes cache entry.
pub const ECHO_CACHE_KEY: &str = "nexus_global_echoes_cache";
/// Prefix of the per-owner story collection.
pub const STORIES_KEY_PREFIX: &str = "nexus_user_stories";

/// Errors raised when writing to a store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value store shared by the gateway subsystems.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value. Malformed content is treated as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(key, error = %e, "Ignoring malformed stored value");
            None
        }
    }
}

/// Encode and write a JSON value.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value)?;
    store.set(key, encoded)
}
