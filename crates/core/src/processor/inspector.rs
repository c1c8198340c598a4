//! Artifact existence checks.

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Answers "is this artifact already there?" for the item processor.
///
/// The filesystem implementation is the default; a status store can take its
/// place without touching the pipeline.
#[async_trait]
pub trait ArtifactInspector: Send + Sync {
    /// Whether a file exists at `path`.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Whether `directory` holds a sidecar for `item_id`: an entry whose name
    /// starts with the id and ends with `.extension`.
    async fn has_sidecar(&self, directory: &Path, item_id: &str, extension: &str)
        -> io::Result<bool>;
}

/// Inspector that looks at the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactInspector;

#[async_trait]
impl ArtifactInspector for FsArtifactInspector {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn has_sidecar(
        &self,
        directory: &Path,
        item_id: &str,
        extension: &str,
    ) -> io::Result<bool> {
        let mut entries = match tokio::fs::read_dir(directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        let suffix = format!(".{}", extension);
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(item_id) && name.ends_with(&suffix) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sidecar_detection() {
        let temp = TempDir::new().unwrap();
        let inspector = FsArtifactInspector;

        assert!(!inspector.has_sidecar(temp.path(), "vid001", "jpg").await.unwrap());

        std::fs::write(temp.path().join("vid002.jpg"), b"").unwrap();
        std::fs::write(temp.path().join("vid001.mp4"), b"").unwrap();
        assert!(!inspector.has_sidecar(temp.path(), "vid001", "jpg").await.unwrap());

        std::fs::write(temp.path().join("vid001_thumb_03.jpg"), b"").unwrap();
        assert!(inspector.has_sidecar(temp.path(), "vid001", "jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_directory_has_no_sidecar() {
        let temp = TempDir::new().unwrap();
        let inspector = FsArtifactInspector;
        assert!(!inspector
            .has_sidecar(&temp.path().join("missing"), "vid001", "jpg")
            .await
            .unwrap());
        assert!(!inspector.exists(&temp.path().join("missing")).await.unwrap());
    }
}
