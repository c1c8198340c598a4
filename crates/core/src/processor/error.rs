//! Error types for the processor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::transcoder::TranscodeError;

/// Errors that fail a single item.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Item id cannot be used as a file name.
    #[error("Invalid item id: {item_id:?}")]
    InvalidItemId { item_id: String },

    /// Fetch step failed.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Remux or trim step failed.
    #[error("Transcode failed: {0}")]
    Transcode(#[from] TranscodeError),

    /// The fetch step reported success but left no artifact behind.
    #[error("No artifact at {path} after fetch")]
    ArtifactMissing { path: PathBuf },

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Pipeline stage that produced the error, for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidItemId { .. } => "validate",
            Self::Fetch(_) | Self::ArtifactMissing { .. } => "fetch",
            Self::Transcode(_) => "transcode",
            Self::Io(_) => "io",
        }
    }

    /// Captured stderr tail of the tool that failed.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Fetch(e) => e.diagnostic(),
            Self::Transcode(e) => e.diagnostic(),
            _ => None,
        }
    }

    /// Whether a later run is likely to succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_retryable(),
            Self::Transcode(e) => e.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }
}
