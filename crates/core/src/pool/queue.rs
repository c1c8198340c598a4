//! Work queue and failure channel.
//!
//! Both are bounded tokio channels: senders wait while a queue is full and
//! receivers wait while it is empty. The work queue receiver is shared by all
//! workers behind an async mutex, so each message is taken by exactly one
//! worker.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::metrics::ITEMS_ENQUEUED;
use crate::processor::WorkRequest;

use super::error::PoolError;

/// A message on the work queue.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkMessage {
    /// Process this request.
    Work(WorkRequest),
    /// Stop after this message. One is sent per worker.
    Shutdown,
}

/// A message on the failure channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMessage {
    /// This item failed.
    Failed(String),
    /// Stop after this message.
    Shutdown,
}

/// Producer half of the work queue.
#[derive(Debug, Clone)]
pub struct WorkSender {
    tx: mpsc::Sender<WorkMessage>,
}

impl WorkSender {
    /// Publishes a request, waiting while the queue is full.
    pub async fn send(&self, request: WorkRequest) -> Result<(), PoolError> {
        self.tx
            .send(WorkMessage::Work(request))
            .await
            .map_err(|_| PoolError::QueueClosed { queue: "work" })?;
        ITEMS_ENQUEUED.inc();
        Ok(())
    }

    /// Publishes one shutdown sentinel.
    pub async fn shutdown(&self) -> Result<(), PoolError> {
        self.tx
            .send(WorkMessage::Shutdown)
            .await
            .map_err(|_| PoolError::QueueClosed { queue: "work" })
    }
}

/// Consumer half of the work queue, cloned into every worker.
#[derive(Debug, Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::Receiver<WorkMessage>>>,
}

impl WorkReceiver {
    /// Takes the next message. `None` once every sender is gone and the queue is drained.
    pub async fn recv(&self) -> Option<WorkMessage> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

/// Creates a bounded work queue.
pub fn work_queue(capacity: usize) -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        WorkSender { tx },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer half of the failure channel.
#[derive(Debug, Clone)]
pub struct FailureSender {
    tx: mpsc::Sender<FailureMessage>,
}

impl FailureSender {
    /// Reports a failed item id.
    pub async fn failed(&self, item_id: impl Into<String>) -> Result<(), PoolError> {
        self.tx
            .send(FailureMessage::Failed(item_id.into()))
            .await
            .map_err(|_| PoolError::QueueClosed { queue: "failure" })
    }

    /// Publishes the logger's shutdown sentinel.
    pub async fn shutdown(&self) -> Result<(), PoolError> {
        self.tx
            .send(FailureMessage::Shutdown)
            .await
            .map_err(|_| PoolError::QueueClosed { queue: "failure" })
    }
}

/// Creates a bounded failure channel.
pub fn failure_channel(capacity: usize) -> (FailureSender, mpsc::Receiver<FailureMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (FailureSender { tx }, rx)
}
