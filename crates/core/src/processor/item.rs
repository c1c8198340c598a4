//! Item processor implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::fetcher::{FetchRequest, Fetcher};
use crate::metrics::{ITEMS_PROCESSED, ITEM_DURATION, UPLOADS};
use crate::storage::{archive_key, ObjectStore};
use crate::transcoder::Transcoder;

use super::config::ProcessorConfig;
use super::error::ProcessError;
use super::inspector::{ArtifactInspector, FsArtifactInspector};
use super::types::{ArtifactPaths, ItemOutcome, SkipReason, WorkRequest};

/// Runs work requests through fetch, remux, archive, trim and cleanup.
///
/// Holds no mutable state, so one processor is shared by every worker.
pub struct ItemProcessor {
    config: ProcessorConfig,
    fetcher: Arc<dyn Fetcher>,
    transcoder: Arc<dyn Transcoder>,
    store: Arc<dyn ObjectStore>,
    inspector: Arc<dyn ArtifactInspector>,
}

impl ItemProcessor {
    /// Creates a processor that inspects artifacts on the local filesystem.
    pub fn new(
        config: ProcessorConfig,
        fetcher: Arc<dyn Fetcher>,
        transcoder: Arc<dyn Transcoder>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            transcoder,
            store,
            inspector: Arc::new(FsArtifactInspector),
        }
    }

    /// Replaces the artifact inspector.
    pub fn with_inspector(mut self, inspector: Arc<dyn ArtifactInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    /// Returns the processor configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Processes one work request.
    pub async fn process(&self, request: &WorkRequest) -> Result<ItemOutcome, ProcessError> {
        let start = Instant::now();
        let result = self.run(request).await;

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(_) => "failed",
        };
        ITEMS_PROCESSED.with_label_values(&[label]).inc();
        ITEM_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(ItemOutcome::Skipped(reason)) => {
                tracing::info!(item_id = %request.item_id, reason = %reason, "Item skipped");
            }
            Ok(ItemOutcome::Completed { archive_key, .. }) => {
                tracing::info!(
                    item_id = %request.item_id,
                    archive_key = ?archive_key,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Item completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    item_id = %request.item_id,
                    stage = e.stage(),
                    retryable = e.is_retryable(),
                    error = %e,
                    diagnostic = ?e.diagnostic(),
                    "Item failed"
                );
            }
        }

        result
    }

    async fn run(&self, request: &WorkRequest) -> Result<ItemOutcome, ProcessError> {
        let item_id = request.item_id.as_str();
        if item_id.trim().is_empty() || item_id.contains('/') || item_id.contains('\\') {
            return Err(ProcessError::InvalidItemId {
                item_id: item_id.to_string(),
            });
        }

        let directory = request.directory.as_path();
        let paths = ArtifactPaths::new(
            directory,
            item_id,
            &self.config.format,
            &self.config.alternate_format,
        );

        // A canonical file left behind by an interrupted run is never trusted.
        if self.inspector.exists(&paths.canonical).await? {
            tracing::debug!(path = %paths.canonical.display(), "Removing stray download");
            remove_if_present(&paths.canonical).await?;
        }

        if self
            .inspector
            .has_sidecar(directory, item_id, &self.config.sidecar_extension)
            .await?
        {
            return Ok(ItemOutcome::Skipped(SkipReason::SidecarPresent));
        }

        if self.inspector.exists(&paths.clip).await? {
            if !self.config.overwrite {
                return Ok(ItemOutcome::Skipped(SkipReason::OutputExists));
            }
            tracing::debug!(path = %paths.clip.display(), "Overwriting existing clip");
            remove_if_present(&paths.clip).await?;
        }

        tokio::fs::create_dir_all(directory).await?;

        if self.inspector.exists(&paths.alternate).await? {
            tracing::debug!(item_id, "Alternate download present, skipping fetch");
        } else {
            let fetched = self
                .fetcher
                .fetch(&FetchRequest {
                    item_id: item_id.to_string(),
                    format: self.config.format.clone(),
                    output_path: paths.canonical.clone(),
                })
                .await?;
            tracing::debug!(item_id, duration_ms = fetched.duration_ms, "Fetched");
        }

        if self.inspector.exists(&paths.alternate).await?
            && !self.inspector.exists(&paths.canonical).await?
        {
            let remuxed = self
                .transcoder
                .remux(&paths.alternate, &paths.canonical)
                .await?;
            tracing::debug!(item_id, duration_ms = remuxed.duration_ms, "Remuxed");
            remove_if_present(&paths.alternate).await?;
        }

        if !self.inspector.exists(&paths.canonical).await? {
            return Err(ProcessError::ArtifactMissing {
                path: paths.canonical,
            });
        }

        if self.config.compress {
            tracing::debug!(item_id, "Compression requested, no compressor configured");
        }

        let archive_key = self.archive(&paths.canonical).await;

        let clip_path = match request.slice {
            Some(bounds) => {
                let trimmed = self
                    .transcoder
                    .trim(&paths.canonical, &paths.clip, bounds)
                    .await?;
                tracing::debug!(item_id, slice = %bounds, duration_ms = trimmed.duration_ms, "Trimmed");
                Some(trimmed.output_path)
            }
            None => None,
        };

        if archive_key.is_some() {
            let delay = self.config.settle_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            remove_if_present(&paths.canonical).await?;
        }

        Ok(ItemOutcome::Completed {
            archive_key,
            clip_path,
        })
    }

    /// Uploads the artifact. Failures are logged and leave the local file in place.
    async fn archive(&self, artifact: &Path) -> Option<String> {
        let Some(key) = archive_key(artifact, self.config.archive_key_depth) else {
            tracing::warn!(path = %artifact.display(), "Cannot derive archive key");
            UPLOADS.with_label_values(&["failed"]).inc();
            return None;
        };

        match self.store.upload(artifact, &key).await {
            Ok(()) => {
                UPLOADS.with_label_values(&["success"]).inc();
                tracing::debug!(key = %key, store = self.store.name(), "Archived");
                Some(key)
            }
            Err(e) => {
                UPLOADS.with_label_values(&["failed"]).inc();
                tracing::warn!(
                    key = %key,
                    path = %artifact.display(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Upload failed, keeping local artifact"
                );
                None
            }
        }
    }
}

async fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
