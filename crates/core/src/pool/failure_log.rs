use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::metrics::FAILURES_LOGGED;

use super::error::PoolError;
use super::queue::{failure_channel, FailureMessage, FailureSender};
use super::types::FailureLogReport;

/// Background task that appends failed item ids to a file
pub struct FailureLogger {
    rx: mpsc::Receiver<FailureMessage>,
    path: PathBuf,
    file: File,
}

impl FailureLogger {
    /// Open (or create) the log in append mode
    pub async fn open(
        rx: mpsc::Receiver<FailureMessage>,
        path: impl AsRef<Path>,
    ) -> Result<Self, PoolError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PoolError::FailureLog {
                    path: path.clone(),
                    source,
                })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| PoolError::FailureLog {
                path: path.clone(),
                source,
            })?;

        Ok(Self { rx, path, file })
    }

    /// Run the logger until its shutdown sentinel arrives
    ///
    /// This should be spawned as a background task. Write errors are logged
    /// and draining continues, so workers never block on a broken log.
    pub async fn run(mut self) -> FailureLogReport {
        tracing::info!(path = %self.path.display(), "Failure logger started");
        let mut report = FailureLogReport::default();

        while let Some(message) = self.rx.recv().await {
            match message {
                FailureMessage::Failed(item_id) => {
                    let line = format!("{}\n", item_id);
                    let written = async {
                        self.file.write_all(line.as_bytes()).await?;
                        self.file.flush().await
                    }
                    .await;

                    match written {
                        Ok(()) => {
                            report.written += 1;
                            FAILURES_LOGGED.inc();
                        }
                        Err(e) => {
                            report.write_errors += 1;
                            tracing::error!(item_id = %item_id, "Failed to write failure log: {}", e);
                        }
                    }
                }
                FailureMessage::Shutdown => {
                    report.shutdown_received = true;
                    break;
                }
            }
        }

        if !report.shutdown_received {
            tracing::warn!("Failure channel closed without a shutdown sentinel");
        }
        if let Err(e) = self.file.sync_all().await {
            tracing::warn!("Failed to sync failure log: {}", e);
        }

        tracing::info!(written = report.written, "Failure logger shutting down");
        report
    }
}

/// Create a failure channel and its logger
///
/// Returns:
/// - `FailureSender` - clone this into every worker
/// - `FailureLogger` - spawn with `tokio::spawn(logger.run())`
pub async fn create_failure_log(
    path: impl AsRef<Path>,
    buffer_size: usize,
) -> Result<(FailureSender, FailureLogger), PoolError> {
    let (tx, rx) = failure_channel(buffer_size);
    let logger = FailureLogger::open(rx, path).await?;
    Ok((tx, logger))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logger_appends_ids_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.txt");
        std::fs::write(&path, "old001\n").unwrap();

        let (tx, logger) = create_failure_log(&path, 10).await.unwrap();
        let handle = tokio::spawn(logger.run());

        tx.failed("vid001").await.unwrap();
        tx.failed("vid002").await.unwrap();
        tx.shutdown().await.unwrap();

        let report = handle.await.unwrap();
        assert_eq!(report.written, 2);
        assert!(report.shutdown_received);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "old001\nvid001\nvid002\n"
        );
    }

    #[tokio::test]
    async fn test_logger_stops_when_senders_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/failed.txt");

        let (tx, logger) = create_failure_log(&path, 10).await.unwrap();
        let handle = tokio::spawn(logger.run());
        tx.failed("vid001").await.unwrap();
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report.written, 1);
        assert!(!report.shutdown_received);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unopenable_log() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let err = create_failure_log(dir.path(), 10).await.err().unwrap();
        assert!(matches!(err, PoolError::FailureLog { .. }));
    }
}
