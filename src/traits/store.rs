//! Persistent key-value storage abstraction.
//!
//! Values are opaque strings (JSON-encoded by callers), keyed by fixed names
//! such as `token`, `recentEmojis` and `savedStickers`.

use crate::error::StorageError;

/// Trait for the local key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the record entirely. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
