//! Pool worker.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::processor::{ItemOutcome, ItemProcessor};

use super::queue::{FailureSender, WorkMessage, WorkReceiver};
use super::types::WorkerReport;

/// One pool worker: takes requests off the shared queue until its sentinel.
pub struct Worker {
    id: usize,
    processor: Arc<ItemProcessor>,
    work_rx: WorkReceiver,
    failure_tx: Option<FailureSender>,
}

impl Worker {
    pub fn new(
        id: usize,
        processor: Arc<ItemProcessor>,
        work_rx: WorkReceiver,
        failure_tx: Option<FailureSender>,
    ) -> Self {
        Self {
            id,
            processor,
            work_rx,
            failure_tx,
        }
    }

    /// Runs until a shutdown sentinel is taken or the queue closes.
    pub async fn run(self) -> WorkerReport {
        let mut report = WorkerReport {
            worker_id: self.id,
            ..WorkerReport::default()
        };
        tracing::debug!(worker_id = self.id, "Worker started");

        loop {
            let Some(message) = self.work_rx.recv().await else {
                tracing::warn!(worker_id = self.id, "Work queue closed without a shutdown sentinel");
                break;
            };

            let request = match message {
                WorkMessage::Shutdown => {
                    report.shutdown_received = true;
                    break;
                }
                WorkMessage::Work(request) => request,
            };

            // A panic in one item must not take the worker down with it.
            let result = AssertUnwindSafe(self.processor.process(&request))
                .catch_unwind()
                .await;

            match result {
                Ok(Ok(ItemOutcome::Completed { .. })) => report.completed += 1,
                Ok(Ok(ItemOutcome::Skipped(_))) => report.skipped += 1,
                Ok(Err(_)) => {
                    report.failed += 1;
                    self.report_failure(&request.item_id).await;
                }
                Err(panic) => {
                    report.failed += 1;
                    report.panicked += 1;
                    tracing::error!(
                        worker_id = self.id,
                        item_id = %request.item_id,
                        panic = %panic_message(panic.as_ref()),
                        "Item processing panicked"
                    );
                    self.report_failure(&request.item_id).await;
                }
            }
        }

        tracing::debug!(
            worker_id = self.id,
            processed = report.processed(),
            failed = report.failed,
            "Worker finished"
        );
        report
    }

    async fn report_failure(&self, item_id: &str) {
        match &self.failure_tx {
            Some(tx) => {
                if let Err(e) = tx.failed(item_id).await {
                    tracing::warn!(worker_id = self.id, item_id, "Failed to report failure: {}", e);
                }
            }
            None => tracing::debug!(worker_id = self.id, item_id, "No failure log configured"),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::queue::{failure_channel, work_queue, FailureMessage};
    use crate::processor::{ProcessorConfig, WorkRequest};
    use crate::testing::{MockFetcher, MockObjectStore, MockTranscoder};
    use std::time::Duration;

    fn processor(fetcher: &MockFetcher) -> Arc<ItemProcessor> {
        Arc::new(ItemProcessor::new(
            ProcessorConfig::default().with_settle_delay(Duration::ZERO),
            Arc::new(fetcher.clone()),
            Arc::new(MockTranscoder::new()),
            Arc::new(MockObjectStore::new()),
        ))
    }

    #[tokio::test]
    async fn test_worker_survives_failures_and_panics() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::new();
        fetcher.fail_for("bad").await;
        fetcher.panic_for("boom").await;

        let (work_tx, work_rx) = work_queue(10);
        let (fail_tx, mut fail_rx) = failure_channel(10);
        let worker = Worker::new(0, processor(&fetcher), work_rx, Some(fail_tx));

        for id in ["bad", "boom", "good"] {
            work_tx.send(WorkRequest::new(id, dir.path())).await.unwrap();
        }
        work_tx.shutdown().await.unwrap();

        let report = worker.run().await;

        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.panicked, 1);
        assert!(report.shutdown_received);
        assert_eq!(fail_rx.recv().await, Some(FailureMessage::Failed("bad".to_string())));
        assert_eq!(fail_rx.recv().await, Some(FailureMessage::Failed("boom".to_string())));
        assert_eq!(fetcher.fetched_ids().await, vec!["bad", "boom", "good"]);
    }

    #[tokio::test]
    async fn test_worker_stops_at_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::new();
        let (work_tx, work_rx) = work_queue(10);
        let worker = Worker::new(0, processor(&fetcher), work_rx.clone(), None);

        work_tx.shutdown().await.unwrap();
        work_tx.send(WorkRequest::new("late", dir.path())).await.unwrap();

        let report = worker.run().await;
        assert!(report.shutdown_received);
        assert_eq!(report.processed(), 0);
        assert_eq!(
            work_rx.recv().await,
            Some(WorkMessage::Work(WorkRequest::new("late", dir.path())))
        );
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
