//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use std::path::PathBuf;

use super::error::FetchError;

/// A request to fetch one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Item identifier.
    pub item_id: String,
    /// Requested container format (e.g. "mp4").
    pub format: String,
    /// Where the tool should write the item.
    pub output_path: PathBuf,
}

/// Result of a successful fetch.
///
/// The tool may have written a different container next to `output_path`;
/// callers inspect the directory afterwards.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Item identifier.
    pub item_id: String,
    /// Requested output path.
    pub output_path: PathBuf,
    /// Fetch duration in milliseconds.
    pub duration_ms: u64,
}

/// A fetcher that downloads remote items to local files.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches one item.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError>;

    /// Validates that the fetcher is properly configured and ready.
    async fn validate(&self) -> Result<(), FetchError>;
}
