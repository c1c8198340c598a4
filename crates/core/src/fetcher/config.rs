//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the `youtube-dl` compatible fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Path to the fetch tool binary (`youtube-dl`, `yt-dlp`).
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// URL template; `{id}` is replaced by the url-encoded item id.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Timeout for a single fetch in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// File receiving the tool's stderr, appended. Discarded when unset.
    #[serde(default)]
    pub tool_log: Option<PathBuf>,

    /// Additional arguments passed before the URL.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_binary() -> PathBuf {
    PathBuf::from("youtube-dl")
}

fn default_url_template() -> String {
    "https://youtube.com/watch?v={id}".to_string()
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            url_template: default_url_template(),
            timeout_secs: default_timeout(),
            tool_log: None,
            extra_args: Vec::new(),
        }
    }
}

impl FetcherConfig {
    /// Sets the tool binary.
    pub fn with_binary(mut self, binary: PathBuf) -> Self {
        self.binary = binary;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the tool log file.
    pub fn with_tool_log(mut self, path: PathBuf) -> Self {
        self.tool_log = Some(path);
        self
    }
}
