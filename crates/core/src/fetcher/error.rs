//! Error types for the fetcher module.

use thiserror::Error;

use crate::exec::ToolError;

/// Errors that can occur while fetching an item.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The item id cannot be turned into a fetch URL.
    #[error("Invalid item id: {item_id:?}")]
    InvalidItemId { item_id: String },

    /// The fetch tool failed.
    #[error("Fetch tool failed: {0}")]
    Tool(#[from] ToolError),
}

impl FetchError {
    /// Tool output explaining the failure, if any was captured.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Tool(e) => e.diagnostic(),
            Self::InvalidItemId { .. } => None,
        }
    }

    /// Whether rerunning the fetch might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Tool(e) => e.is_retryable(),
            Self::InvalidItemId { .. } => false,
        }
    }
}
