//! Mock object store for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{normalize_key, ObjectStore, StorageError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// Local file that was uploaded.
    pub local_path: PathBuf,
    /// Key it was stored under.
    pub key: String,
    /// Whether the upload succeeded.
    pub success: bool,
}

/// In-memory implementation of the ObjectStore trait.
#[derive(Debug, Clone)]
pub struct MockObjectStore {
    /// Stored objects by key.
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    /// Recorded uploads.
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// Keys whose uploads always fail.
    failing_keys: Arc<RwLock<HashSet<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<StorageError>>>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            uploads: Arc::new(RwLock::new(Vec::new())),
            failing_keys: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Preload an object.
    pub async fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.objects.write().await.insert(key.into(), data.into());
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Contents of a stored object.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Make every upload to `key` fail.
    pub async fn fail_key(&self, key: impl Into<String>) {
        self.failing_keys.write().await.insert(key.into());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: StorageError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<StorageError> {
        self.next_error.write().await.take()
    }

    async fn store(&self, local_path: &Path, key: &str) -> Result<(), StorageError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if self.failing_keys.read().await.contains(key) {
            return Err(StorageError::backend("mock", format!("upload of {} rejected", key)));
        }
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::LocalFileMissing {
                    path: local_path.to_path_buf(),
                }
            } else {
                StorageError::Io(e)
            }
        })?;
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_names(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        let prefix = prefix.map(|p| p.trim_start_matches('/')).unwrap_or("");
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<(), StorageError> {
        let key = normalize_key(remote_key)?;
        let result = self.store(local_path, &key).await;
        self.uploads.write().await.push(RecordedUpload {
            local_path: local_path.to_path_buf(),
            key,
            success: result.is_ok(),
        });
        result
    }

    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<(), StorageError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        let key = normalize_key(remote_key)?;
        let data = self
            .objects
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(StorageError::NotFound { key })?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local_path, data).await?;
        Ok(())
    }
}
