//! Directory-backed object store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::StorageError;
use super::key::normalize_key;
use super::traits::ObjectStore;

/// Object store that mirrors keys as files under a root directory.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates a store rooted at `root`. The directory is created on first upload.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let key = normalize_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, seg| path.join(seg)))
    }

    /// Copies through a sibling temp file so a partial copy never shows up
    /// under the final name.
    async fn copy_into_place(source: &Path, destination: &Path) -> Result<(), StorageError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut tmp = destination.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = fs::copy(source, &tmp).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        fs::rename(&tmp, destination).await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn list_names(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let prefix = prefix.map(|p| p.trim_start_matches('/')).unwrap_or("");
        let mut names = Vec::new();

        if !fs::try_exists(&self.root).await? {
            return Ok(names);
        }

        let mut pending = vec![(self.root.clone(), String::new())];
        while let Some((dir, rel)) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().to_string();
                let key = if rel.is_empty() {
                    name
                } else {
                    format!("{}/{}", rel, name)
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), key));
                } else if file_type.is_file() && key.starts_with(prefix) && !key.ends_with(".tmp") {
                    names.push(key);
                }
            }
        }

        names.sort();
        Ok(names)
    }

    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<(), StorageError> {
        let destination = self.path_for(remote_key)?;
        if !fs::try_exists(local_path).await? {
            return Err(StorageError::LocalFileMissing {
                path: local_path.to_path_buf(),
            });
        }
        Self::copy_into_place(local_path, &destination).await?;
        tracing::debug!(key = %remote_key, path = %destination.display(), "Stored object");
        Ok(())
    }

    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<(), StorageError> {
        let source = self.path_for(remote_key)?;
        if !fs::try_exists(&source).await? {
            return Err(StorageError::NotFound {
                key: remote_key.to_string(),
            });
        }
        Self::copy_into_place(&source, local_path).await
    }
}
