//! Types for the processor module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::transcoder::SliceBounds;

/// One unit of work: fetch `item_id` into `directory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRequest {
    /// Remote item identifier.
    pub item_id: String,
    /// Directory that receives the local artifacts.
    pub directory: PathBuf,
    /// Time range to cut into the clip output.
    #[serde(default)]
    pub slice: Option<SliceBounds>,
}

impl WorkRequest {
    /// Creates a request without a slice.
    pub fn new(item_id: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            item_id: item_id.into(),
            directory: directory.into(),
            slice: None,
        }
    }

    /// Adds a slice.
    pub fn with_slice(mut self, slice: SliceBounds) -> Self {
        self.slice = Some(slice);
        self
    }
}

/// Why an item was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A sidecar file for the item is present.
    SidecarPresent,
    /// The clip output exists and overwrite is off.
    OutputExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SidecarPresent => write!(f, "sidecar present"),
            Self::OutputExists => write!(f, "output exists"),
        }
    }
}

/// Successful result of processing an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Pipeline ran.
    Completed {
        /// Key of the archived artifact, if the upload succeeded.
        archive_key: Option<String>,
        /// Clip output, if a slice was requested.
        clip_path: Option<PathBuf>,
    },
    /// Nothing to do.
    Skipped(SkipReason),
}

impl ItemOutcome {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Skipped(_) => "skipped",
        }
    }
}

/// Local paths used while processing one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// `directory/item_id.format`
    pub canonical: PathBuf,
    /// `directory/item_id.alternate_format`
    pub alternate: PathBuf,
    /// `directory/item_id.clip.format`
    pub clip: PathBuf,
}

impl ArtifactPaths {
    pub fn new(directory: &Path, item_id: &str, format: &str, alternate_format: &str) -> Self {
        Self {
            canonical: directory.join(format!("{}.{}", item_id, format)),
            alternate: directory.join(format!("{}.{}", item_id, alternate_format)),
            clip: directory.join(format!("{}.clip.{}", item_id, format)),
        }
    }
}
