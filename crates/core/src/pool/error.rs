//! Error types for the pool module.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that abort a pool run.
///
/// Item failures never show up here; they go to the failure log.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Pool settings are unusable.
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// A queue was closed while it was still needed.
    #[error("{queue} queue closed unexpectedly")]
    QueueClosed { queue: &'static str },

    /// Failure log could not be opened.
    #[error("Cannot open failure log {path}: {source}")]
    FailureLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source directory could not be listed.
    #[error("Cannot list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be read.
    #[error("Cannot read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive listing for resume failed.
    #[error("Archive listing failed: {0}")]
    Storage(#[from] StorageError),

    /// Other local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
