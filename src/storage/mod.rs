//! Durable client-side key-value storage
//!
//! Everything the client persists between runs (tokens, bookmarks, timers)
//! goes through a [`KeyValueStore`] under fixed keys.

mod file;
mod local;
mod memory;
mod tokens;

pub use file::FileStore;
pub use local::{LocalState, BOOKMARKS_KEY};
pub use memory::MemoryStore;
pub use tokens::{TokenPair, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use std::collections::BTreeMap;

/// Flat string-to-string map as persisted on disk.
pub type Entries = BTreeMap<String, String>;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage file {path} is locked by another process")]
    Locked { path: String },

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Key-value storage with atomic multi-key updates.
///
/// Implementors provide `snapshot` and `update`; single-key helpers are
/// derived from them so that a wholesale token swap is one write.
pub trait KeyValueStore: Send + Sync {
    /// Read every entry.
    fn snapshot(&self) -> Result<Entries, StorageError>;

    /// Apply `apply` to the current entries and persist the result.
    fn update(&self, apply: &mut dyn FnMut(&mut Entries)) -> Result<(), StorageError>;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(&mut |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(&mut |entries| {
            entries.remove(key);
        })
    }
}
