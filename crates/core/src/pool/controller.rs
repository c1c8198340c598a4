//! Pool controller: owns the lifecycle of a batch run.

use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::manifest;
use crate::processor::ItemProcessor;
use crate::storage::ObjectStore;

use super::config::{JobConfig, PoolConfig};
use super::error::PoolError;
use super::failure_log::create_failure_log;
use super::feeder::{ArchiveIndex, Feeder};
use super::queue::work_queue;
use super::types::PoolReport;
use super::worker::Worker;

/// Runs one batch: failure logger, workers, feeder, then an ordered shutdown.
///
/// Shutdown order:
/// 1. the feeder publishes all work, then one sentinel per worker
/// 2. every worker is joined
/// 3. the failure logger gets its sentinel and is joined
pub struct PoolController {
    config: PoolConfig,
    job: JobConfig,
    processor: Arc<ItemProcessor>,
    store: Arc<dyn ObjectStore>,
}

impl PoolController {
    /// `store` is only read, to skip manifest ids that are already archived.
    pub fn new(
        config: PoolConfig,
        job: JobConfig,
        processor: Arc<ItemProcessor>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            job,
            processor,
            store,
        }
    }

    /// Runs the batch to completion.
    ///
    /// Item failures never fail the run; they are counted in the report and
    /// written to the failure log. An error is returned only when the run
    /// could not start or feeding stopped early, and always after every
    /// worker and the logger have been shut down.
    pub async fn run(&self) -> Result<PoolReport, PoolError> {
        if self.config.num_workers == 0 {
            return Err(PoolError::InvalidConfig(
                "num_workers must be at least 1".to_string(),
            ));
        }
        if self.config.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pool_run", run_id = %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> Result<PoolReport, PoolError> {
        let started_at = Utc::now();
        let num_workers = self.config.num_workers;
        let capacity = self.config.queue_capacity;

        tracing::info!(
            workers = num_workers,
            failure_log = ?self.config.failure_log,
            categories = ?self.job.categories,
            manifest = ?self.job.manifest,
            "Starting pool run"
        );

        // Resolved up front so a bad manifest or an unreachable store fails
        // before anything starts.
        let archived = self.archived_names().await?;
        let manifest_ids = self.resolve_manifest(archived.as_deref()).await?;

        let (work_tx, work_rx) = work_queue(capacity);

        let (failure_tx, logger_handle) = match &self.config.failure_log {
            Some(path) => {
                let (tx, logger) = create_failure_log(path, capacity).await?;
                let handle = tokio::spawn(logger.run().in_current_span());
                (Some(tx), Some(handle))
            }
            None => (None, None),
        };

        let worker_handles: Vec<_> = (0..num_workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&self.processor),
                    work_rx.clone(),
                    failure_tx.clone(),
                );
                tokio::spawn(worker.run().in_current_span())
            })
            .collect();
        drop(work_rx);

        let mut feeder = Feeder::new(work_tx);
        if let Some(names) = archived {
            let processor = self.processor.config();
            feeder = feeder.with_archive_index(ArchiveIndex::new(
                names,
                processor.format.clone(),
                processor.archive_key_depth,
            ));
        }
        let feed_result = match manifest_ids {
            Some((ids, already_archived)) => {
                feeder.record_already_archived(already_archived);
                feeder.feed_manifest(&ids, &self.job).await
            }
            None => feeder.feed_job(&self.job).await,
        };
        if let Err(ref e) = feed_result {
            tracing::error!("Feeding stopped early: {}", e);
        }
        let sentinel_result = feeder.shutdown_workers(num_workers).await;
        let feed = feeder.finish();

        let mut workers = Vec::with_capacity(num_workers);
        let mut lost_workers = 0;
        for handle in worker_handles {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(e) => {
                    lost_workers += 1;
                    tracing::error!("Worker task ended abnormally: {}", e);
                }
            }
        }

        let failure_log = match (failure_tx, logger_handle) {
            (Some(tx), Some(handle)) => {
                if let Err(e) = tx.shutdown().await {
                    tracing::warn!("Failed to stop failure logger: {}", e);
                }
                drop(tx);
                match handle.await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::error!("Failure logger task ended abnormally: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        let report = PoolReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            feed,
            workers,
            lost_workers,
            failure_log,
        };

        tracing::info!(
            enqueued = report.feed.enqueued,
            completed = report.completed(),
            skipped = report.skipped(),
            failed = report.failed(),
            already_archived = report.feed.already_archived,
            failures_logged = report.failure_log.as_ref().map(|l| l.written).unwrap_or(0),
            duration_ms = report.duration_ms(),
            "Pool run finished"
        );

        feed_result?;
        sentinel_result?;
        Ok(report)
    }

    /// Archived object names, listed once when resume is enabled.
    async fn archived_names(&self) -> Result<Option<Vec<String>>, PoolError> {
        if !self.job.resume {
            return Ok(None);
        }
        let names = self.store.list_names(None).await?;
        tracing::info!(
            archived = names.len(),
            store = self.store.name(),
            "Listed archive for resume"
        );
        Ok(Some(names))
    }

    /// Loads the manifest, if any, and drops ids that are already archived.
    async fn resolve_manifest(
        &self,
        archived: Option<&[String]>,
    ) -> Result<Option<(Vec<String>, usize)>, PoolError> {
        let Some(path) = &self.job.manifest else {
            return Ok(None);
        };

        let ids = manifest::load_manifest(path)
            .await
            .map_err(|source| PoolError::Manifest {
                path: path.clone(),
                source,
            })?;

        let Some(archived) = archived else {
            return Ok(Some((ids, 0)));
        };

        let (remaining, dropped) = manifest::filter_archived(ids, archived);
        tracing::info!(
            remaining = remaining.len(),
            already_archived = dropped,
            "Filtered manifest against archive"
        );
        Ok(Some((remaining, dropped)))
    }
}
