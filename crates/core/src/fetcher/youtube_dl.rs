//! `youtube-dl` compatible fetcher implementation.

use async_trait::async_trait;
use tokio::time::Duration;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::{FetchRequest, FetchResult, Fetcher};
use crate::exec::ToolInvocation;

/// Fetcher that shells out to `youtube-dl` (or a compatible fork).
pub struct YoutubeDlFetcher {
    config: FetcherConfig,
}

impl YoutubeDlFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    /// Builds the remote URL for an item.
    fn build_url(&self, item_id: &str) -> Result<String, FetchError> {
        if item_id.trim().is_empty() {
            return Err(FetchError::InvalidItemId {
                item_id: item_id.to_string(),
            });
        }
        Ok(self
            .config
            .url_template
            .replace("{id}", &urlencoding::encode(item_id)))
    }

    /// Builds the tool arguments for a fetch.
    fn build_args(&self, request: &FetchRequest) -> Result<Vec<String>, FetchError> {
        let url = self.build_url(&request.item_id)?;

        let mut args = self.config.extra_args.clone();
        args.extend([
            url,
            "--quiet".to_string(),
            "-f".to_string(),
            format!("bestvideo[ext={}]+bestaudio/best", request.format),
            "--output".to_string(),
            request.output_path.to_string_lossy().to_string(),
            "--no-continue".to_string(),
        ]);
        Ok(args)
    }
}

#[async_trait]
impl Fetcher for YoutubeDlFetcher {
    fn name(&self) -> &str {
        "youtube-dl"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        let args = self.build_args(request)?;

        let output = ToolInvocation::new(
            "fetch",
            &self.config.binary,
            Duration::from_secs(self.config.timeout_secs),
        )
        .args(args)
        .with_stderr_log(self.config.tool_log.clone())
        .run()
        .await?;

        Ok(FetchResult {
            item_id: request.item_id.clone(),
            output_path: request.output_path.clone(),
            duration_ms: output.duration_ms,
        })
    }

    async fn validate(&self) -> Result<(), FetchError> {
        ToolInvocation::new("fetch", &self.config.binary, Duration::from_secs(30))
            .args(["--version"])
            .run()
            .await
            .map(|_| ())
            .map_err(FetchError::from)
    }
}
