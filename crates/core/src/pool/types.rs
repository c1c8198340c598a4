//! Reports produced by a pool run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counters kept by one worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Items whose processing panicked. Also counted in `failed`.
    pub panicked: usize,
    /// Whether the worker stopped on its sentinel.
    pub shutdown_received: bool,
}

impl WorkerReport {
    /// Items this worker took off the queue.
    pub fn processed(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

/// Counters kept by the failure logger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLogReport {
    pub written: usize,
    pub write_errors: usize,
    pub shutdown_received: bool,
}

/// Counters kept by the feeder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReport {
    /// Work requests published.
    pub enqueued: usize,
    /// Items dropped because they were already fed in this run.
    pub duplicates: usize,
    /// Source entries without a usable id.
    pub ignored_entries: usize,
    /// Items dropped because their artifact is already archived.
    pub already_archived: usize,
    /// Categories skipped by the skip policy or missing from the source.
    pub skipped_categories: Vec<String>,
    /// Shutdown sentinels published.
    pub sentinels: usize,
}

/// Summary of a whole pool run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub feed: FeedReport,
    pub workers: Vec<WorkerReport>,
    /// Workers whose task ended abnormally.
    pub lost_workers: usize,
    pub failure_log: Option<FailureLogReport>,
}

impl PoolReport {
    pub fn completed(&self) -> usize {
        self.workers.iter().map(|w| w.completed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.workers.iter().map(|w| w.skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }

    /// Items taken off the work queue.
    pub fn processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed()).sum()
    }

    /// Worker sentinels consumed.
    pub fn sentinels_consumed(&self) -> usize {
        self.workers.iter().filter(|w| w.shutdown_received).count()
    }

    /// Run duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let now = Utc::now();
        let report = PoolReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            feed: FeedReport::default(),
            workers: vec![
                WorkerReport {
                    worker_id: 0,
                    completed: 2,
                    skipped: 1,
                    failed: 1,
                    panicked: 0,
                    shutdown_received: true,
                },
                WorkerReport {
                    worker_id: 1,
                    completed: 1,
                    skipped: 0,
                    failed: 1,
                    panicked: 1,
                    shutdown_received: true,
                },
            ],
            lost_workers: 0,
            failure_log: None,
        };

        assert_eq!(report.completed(), 3);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.processed(), 6);
        assert_eq!(report.sentinels_consumed(), 2);
        assert_eq!(report.duration_ms(), 0);
    }
}
