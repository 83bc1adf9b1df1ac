//! History storage error types.

use skinme_core::{AppError, StorageError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl HistoryError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Io { .. } => AppError::Storage(StorageError::WriteFailed(err.to_string())),
            HistoryError::Serialize(e) => AppError::Storage(StorageError::Corruption(e.to_string())),
            HistoryError::InvalidKey(k) => AppError::Storage(StorageError::Unavailable(k)),
        }
    }
}
