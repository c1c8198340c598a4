//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to an object store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Remote entry does not exist.
    #[error("Remote entry not found: {key}")]
    NotFound { key: String },

    /// Key is empty or escapes the store root.
    #[error("Invalid key: {key:?}")]
    InvalidKey { key: String },

    /// Local file to upload is missing.
    #[error("Local file not found: {path}")]
    LocalFileMissing { path: PathBuf },

    /// Backend request failed.
    #[error("{backend} request failed: {reason}")]
    Backend { backend: String, reason: String },

    /// Store is misconfigured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Creates a backend error.
    pub fn backend(backend: impl Into<String>, reason: impl ToString) -> Self {
        Self::Backend {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Io(_))
    }
}
