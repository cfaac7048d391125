//! Local storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the persisted key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not determine a data directory")]
    NoDataDir,
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "E_STORE_READ",
            StorageError::Write { .. } => "E_STORE_WRITE",
            StorageError::Corrupt { .. } => "E_STORE_CORRUPT",
            StorageError::NoDataDir => "E_STORE_NODIR",
        }
    }
}
