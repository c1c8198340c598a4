//! Configuration for the storage module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Available storage backends.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    S3,
    #[default]
    Filesystem,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Backend type.
    #[serde(default)]
    pub backend: StorageBackend,
    /// S3 settings (required when backend = "s3").
    #[serde(default)]
    pub s3: Option<S3Config>,
    /// Filesystem settings (used when backend = "filesystem").
    #[serde(default)]
    pub filesystem: Option<FsStoreConfig>,
}

/// S3 bucket configuration.
///
/// Credentials come from the standard AWS provider chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// Region; the provider chain decides when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO etc).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Prefix prepended to every key.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Use path-style addressing (needed by most self-hosted services).
    #[serde(default)]
    pub force_path_style: bool,
}

/// Directory-backed store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FsStoreConfig {
    /// Root directory of the archive.
    #[serde(default = "default_fs_root")]
    pub root: PathBuf,
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            root: default_fs_root(),
        }
    }
}

fn default_fs_root() -> PathBuf {
    PathBuf::from("archive")
}
