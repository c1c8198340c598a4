//! Configuration for the worker pool and the batch job it runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    /// Capacity of the work queue and the failure channel.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// File that collects failed item ids, one per line.
    #[serde(default)]
    pub failure_log: Option<PathBuf>,
}

fn default_num_workers() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    100
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            queue_capacity: default_queue_capacity(),
            failure_log: None,
        }
    }
}

impl PoolConfig {
    /// Set the number of workers.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Set the failure log destination.
    pub fn with_failure_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_log = Some(path.into());
        self
    }
}

/// What a batch run feeds into the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Directory whose file names (or category subdirectories) name the items.
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Directory receiving local artifacts.
    #[serde(default = "default_target_root")]
    pub target_root: PathBuf,

    /// Categories to feed. Empty means a flat listing of `source_root`.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Skip categories whose target subdirectory already exists.
    #[serde(default)]
    pub skip_existing_categories: bool,

    /// Manifest of item ids; replaces the directory listing when set.
    #[serde(default)]
    pub manifest: Option<PathBuf>,

    /// Category subdirectory for manifest items.
    #[serde(default)]
    pub manifest_category: Option<String>,

    /// Drop manifest ids that are already archived.
    #[serde(default = "default_resume")]
    pub resume: bool,
}

fn default_source_root() -> PathBuf {
    PathBuf::from("source")
}

fn default_target_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_resume() -> bool {
    true
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            target_root: default_target_root(),
            categories: Vec::new(),
            skip_existing_categories: false,
            manifest: None,
            manifest_category: None,
            resume: default_resume(),
        }
    }
}

impl JobConfig {
    /// Creates a job for the given roots.
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            ..Self::default()
        }
    }

    /// Set the categories to feed.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the skip policy for existing categories.
    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing_categories = skip;
        self
    }

    /// Feed from a manifest instead of the source listing.
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = Some(path.into());
        self
    }

    /// Place manifest items under a category subdirectory.
    pub fn with_manifest_category(mut self, category: impl Into<String>) -> Self {
        self.manifest_category = Some(category.into());
        self
    }
}

/// Directory name for a category: spaces become underscores.
pub fn category_dir_name(category: &str) -> String {
    category.replace(' ', "_")
}
