//! S3-compatible object store.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::config::S3Config;
use super::error::StorageError;
use super::key::normalize_key;
use super::traits::ObjectStore;

const BACKEND: &str = "s3";

/// Object store backed by an S3 bucket.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3ObjectStore {
    /// Creates a store using the default AWS credential chain.
    pub async fn new(config: S3Config) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Config("S3 bucket cannot be empty".to_string()));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region.clone() {
            loader = loader.region(Region::new(region));
        }
        // S3-compatible services (MinIO, Ceph, ...)
        if let Some(endpoint) = config.endpoint_url.clone() {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            bucket = %config.bucket,
            prefix = ?config.prefix,
            endpoint = ?config.endpoint_url,
            "S3 object store ready"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
            prefix: config
                .prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    /// Full bucket key for a store key.
    fn object_key(&self, key: &str) -> Result<String, StorageError> {
        let key = normalize_key(key)?;
        Ok(match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => key,
        })
    }

    /// Store key for a full bucket key.
    fn store_key<'a>(&self, object_key: &'a str) -> &'a str {
        match &self.prefix {
            Some(prefix) => object_key
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(object_key),
            None => object_key,
        }
    }

    fn list_prefix(&self, prefix: Option<&str>) -> Option<String> {
        let prefix = prefix
            .map(|p| p.trim_start_matches('/'))
            .filter(|p| !p.is_empty());
        match (&self.prefix, prefix) {
            (Some(base), Some(p)) => Some(format!("{}/{}", base, p)),
            (Some(base), None) => Some(format!("{}/", base)),
            (None, Some(p)) => Some(p.to_string()),
            (None, None) => None,
        }
    }
}

fn temp_path(local_path: &Path) -> PathBuf {
    let mut name = OsString::from(local_path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn list_names(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let list_prefix = self.list_prefix(prefix);
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(ref p) = list_prefix {
                request = request.prefix(p);
            }
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::backend(BACKEND, DisplayErrorContext(&e)))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    names.push(self.store_key(key).to_string());
                }
            }

            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        names.sort();
        tracing::debug!(bucket = %self.bucket, count = names.len(), "Listed archive entries");
        Ok(names)
    }

    async fn upload(&self, local_path: &Path, remote_key: &str) -> Result<(), StorageError> {
        let key = self.object_key(remote_key)?;
        if !tokio::fs::try_exists(local_path).await? {
            return Err(StorageError::LocalFileMissing {
                path: local_path.to_path_buf(),
            });
        }

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::backend(BACKEND, e))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::backend(BACKEND, DisplayErrorContext(&e)))?;

        tracing::debug!(bucket = %self.bucket, key = %key, "Uploaded object");
        Ok(())
    }

    async fn download(&self, remote_key: &str, local_path: &Path) -> Result<(), StorageError> {
        let key = self.object_key(remote_key)?;

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_no_such_key()) {
                    StorageError::NotFound {
                        key: remote_key.to_string(),
                    }
                } else {
                    StorageError::backend(BACKEND, DisplayErrorContext(&e))
                }
            })?;

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(local_path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        let mut body = response.body;
        let written = async {
            while let Some(chunk) = body
                .try_next()
                .await
                .map_err(|e| StorageError::backend(BACKEND, e))?
            {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok::<(), StorageError>(())
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        tokio::fs::rename(&tmp, local_path).await?;
        tracing::debug!(bucket = %self.bucket, key = %key, path = %local_path.display(), "Downloaded object");
        Ok(())
    }
}
