//! Storage module for archiving artifacts to remote object storage.
//!
//! This module provides the `ObjectStore` trait and two backends:
//! - `S3ObjectStore`: any S3-compatible bucket
//! - `FsObjectStore`: a directory tree, for local mirrors and dry runs
//!
//! Keys are POSIX-style paths; a leading `/` is stripped before use.

mod config;
mod error;
mod fs_store;
mod key;
mod s3;
mod traits;

pub use config::{FsStoreConfig, S3Config, StorageBackend, StorageConfig};
pub use error::StorageError;
pub use fs_store::FsObjectStore;
pub use key::{archive_key, key_stem, normalize_key};
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;

use std::sync::Arc;

/// Builds the configured object store backend.
pub async fn create_object_store(
    config: &StorageConfig,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .clone()
                .ok_or_else(|| StorageError::Config("s3 backend selected but [storage.s3] is missing".to_string()))?;
            Ok(Arc::new(S3ObjectStore::new(s3).await?))
        }
        StorageBackend::Filesystem => {
            let fs = config.filesystem.clone().unwrap_or_default();
            Ok(Arc::new(FsObjectStore::new(fs.root)))
        }
    }
}
