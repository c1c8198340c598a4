//! Configuration for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Timeout for a single remux or trim in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level for remuxing.
    #[serde(default = "default_remux_log_level")]
    pub remux_log_level: String,

    /// FFmpeg log level for trimming.
    #[serde(default = "default_trim_log_level")]
    pub trim_log_level: String,

    /// File receiving ffmpeg's stderr, appended.
    #[serde(default)]
    pub tool_log: Option<PathBuf>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_remux_log_level() -> String {
    "fatal".to_string()
}

fn default_trim_log_level() -> String {
    "quiet".to_string()
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_timeout(),
            remux_log_level: default_remux_log_level(),
            trim_log_level: default_trim_log_level(),
            tool_log: None,
        }
    }
}

impl TranscoderConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
