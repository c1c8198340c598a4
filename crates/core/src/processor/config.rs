//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the per-item pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Canonical container extension.
    #[serde(default = "default_format")]
    pub format: String,

    /// Container the fetch tool falls back to when it has to merge streams.
    #[serde(default = "default_alternate_format")]
    pub alternate_format: String,

    /// Reprocess items whose clip output already exists.
    #[serde(default)]
    pub overwrite: bool,

    /// Compression hook. Accepted but currently has no effect.
    #[serde(default)]
    pub compress: bool,

    /// Extension of sidecar files that mark an item as already processed.
    #[serde(default = "default_sidecar_extension")]
    pub sidecar_extension: String,

    /// Delay between a successful upload and local removal, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Number of trailing path segments forming the archive key.
    #[serde(default = "default_archive_key_depth")]
    pub archive_key_depth: usize,
}

fn default_format() -> String {
    "mp4".to_string()
}

fn default_alternate_format() -> String {
    "mkv".to_string()
}

fn default_sidecar_extension() -> String {
    "jpg".to_string()
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_archive_key_depth() -> usize {
    3
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            alternate_format: default_alternate_format(),
            overwrite: false,
            compress: false,
            sidecar_extension: default_sidecar_extension(),
            settle_delay_ms: default_settle_delay_ms(),
            archive_key_depth: default_archive_key_depth(),
        }
    }
}

impl ProcessorConfig {
    /// Set overwrite behavior.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the archive key depth.
    pub fn with_archive_key_depth(mut self, depth: usize) -> Self {
        self.archive_key_depth = depth;
        self
    }

    /// Settle delay as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
