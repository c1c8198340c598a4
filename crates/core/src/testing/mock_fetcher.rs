//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::exec::ToolError;
use crate::fetcher::{FetchError, FetchRequest, FetchResult, Fetcher};

/// What the mock leaves on disk after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFetchOutput {
    /// Writes the requested output path.
    Canonical,
    /// Writes the output path with this extension instead, like a tool that
    /// had to merge streams into another container.
    Alternate(String),
    /// Writes nothing.
    Nothing,
}

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Track fetch requests for assertions
/// - Fail (or panic) for specific item ids
/// - Simulate slow downloads
///
/// # Example
///
/// ```rust,ignore
/// use clipharvest_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.fail_for("vid001").await;
///
/// // ...run the pool...
///
/// assert_eq!(fetcher.fetch_count().await, 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockFetcher {
    /// Recorded fetch requests.
    requests: Arc<RwLock<Vec<FetchRequest>>>,
    /// Item ids that always fail.
    failing_ids: Arc<RwLock<HashSet<String>>>,
    /// Output paths that always fail.
    failing_paths: Arc<RwLock<HashSet<PathBuf>>>,
    /// Item ids that panic mid-fetch.
    panicking_ids: Arc<RwLock<HashSet<String>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// What a successful fetch writes.
    output: Arc<RwLock<MockFetchOutput>>,
    /// Simulated fetch duration.
    fetch_duration: Arc<RwLock<Duration>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Bytes written for every fetched artifact.
    pub const CONTENT: &'static [u8] = b"fetched media";

    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            failing_ids: Arc::new(RwLock::new(HashSet::new())),
            failing_paths: Arc::new(RwLock::new(HashSet::new())),
            panicking_ids: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            output: Arc::new(RwLock::new(MockFetchOutput::Canonical)),
            fetch_duration: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded fetch requests.
    pub async fn recorded_requests(&self) -> Vec<FetchRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of fetches attempted.
    pub async fn fetch_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Item ids fetched, in call order.
    pub async fn fetched_ids(&self) -> Vec<String> {
        self.requests
            .read()
            .await
            .iter()
            .map(|r| r.item_id.clone())
            .collect()
    }

    /// Make every fetch of `item_id` fail like a non-zero tool exit.
    pub async fn fail_for(&self, item_id: impl Into<String>) {
        self.failing_ids.write().await.insert(item_id.into());
    }

    /// Make fetches into `output_path` fail, leaving the same id elsewhere alone.
    pub async fn fail_for_path(&self, output_path: impl Into<PathBuf>) {
        self.failing_paths.write().await.insert(output_path.into());
    }

    /// Make every fetch of `item_id` panic.
    pub async fn panic_for(&self, item_id: impl Into<String>) {
        self.panicking_ids.write().await.insert(item_id.into());
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set what a successful fetch writes.
    pub async fn set_output(&self, output: MockFetchOutput) {
        *self.output.write().await = output;
    }

    /// Set the simulated fetch duration.
    pub async fn set_fetch_duration(&self, duration: Duration) {
        *self.fetch_duration.write().await = duration;
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        self.requests.write().await.push(request.clone());

        let duration = *self.fetch_duration.read().await;
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        let should_panic = self.panicking_ids.read().await.contains(&request.item_id);
        if should_panic {
            panic!("mock fetcher panic for {}", request.item_id);
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let should_fail = self.failing_ids.read().await.contains(&request.item_id)
            || self.failing_paths.read().await.contains(&request.output_path);
        if should_fail {
            return Err(FetchError::Tool(ToolError::failed(
                "fetch",
                Some(1),
                format!("ERROR: {}: Video unavailable\n", request.item_id),
            )));
        }

        let output = self.output.read().await.clone();
        let written = match output {
            MockFetchOutput::Canonical => Some(request.output_path.clone()),
            MockFetchOutput::Alternate(ext) => Some(request.output_path.with_extension(ext)),
            MockFetchOutput::Nothing => None,
        };
        if let Some(path) = written {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| FetchError::Tool(ToolError::Io(e)))?;
            }
            tokio::fs::write(&path, Self::CONTENT)
                .await
                .map_err(|e| FetchError::Tool(ToolError::Io(e)))?;
        }

        Ok(FetchResult {
            item_id: request.item_id.clone(),
            output_path: request.output_path.clone(),
            duration_ms: duration.as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), FetchError> {
        Ok(())
    }
}
