//! Error types for external tool invocations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool binary not found.
    #[error("{tool} not found at path: {path}")]
    NotFound { tool: String, path: PathBuf },

    /// Tool exited with a non-zero status.
    #[error("{tool} exited with code {code:?}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// Tool did not finish within the configured timeout.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: String, timeout_secs: u64 },

    /// I/O error while spawning or talking to the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Creates a new failure from an exit code and captured stderr.
    pub fn failed(tool: impl Into<String>, code: Option<i32>, stderr: String) -> Self {
        Self::Failed {
            tool: tool.into(),
            code,
            stderr: if stderr.trim().is_empty() {
                None
            } else {
                Some(stderr)
            },
        }
    }

    /// Captured diagnostic output, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// Whether rerunning the same invocation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io(_))
    }
}
