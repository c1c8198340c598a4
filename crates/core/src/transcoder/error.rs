//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

use crate::exec::ToolError;

/// Errors that can occur while remuxing or trimming.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Slice bounds are unusable.
    #[error("Invalid slice: {reason}")]
    InvalidSlice { reason: String },

    /// The tool exited successfully but wrote nothing.
    #[error("Output file not created: {path}")]
    OutputMissing { path: PathBuf },

    /// FFmpeg failed.
    #[error("FFmpeg failed: {0}")]
    Tool(#[from] ToolError),

    /// I/O error around the transcode.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Creates a new invalid slice error.
    pub fn invalid_slice(reason: impl Into<String>) -> Self {
        Self::InvalidSlice {
            reason: reason.into(),
        }
    }

    /// Tool output explaining the failure, if any was captured.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Tool(e) => e.diagnostic(),
            _ => None,
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Tool(e) => e.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }
}
