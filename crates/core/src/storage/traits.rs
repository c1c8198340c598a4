//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;

use super::error::StorageError;

/// An object store holding archived artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Lists entry names, optionally restricted to a key prefix, sorted.
    async fn list_names(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError>;

    /// Uploads a local file under `remote_key`, replacing any existing entry.
    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<(), StorageError>;

    /// Downloads `remote_key` to `local_path`, creating parent directories.
    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<(), StorageError>;
}
