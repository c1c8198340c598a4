//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcoder::{SliceBounds, TranscodeError, TranscodeResult, Transcoder};

/// Kind of transcoder operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TranscodeOp {
    Remux,
    Trim(SliceBounds),
}

/// A recorded transcoder operation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// Operation kind.
    pub op: TranscodeOp,
    /// Input file.
    pub input: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Whether the operation succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Successful operations copy the input file to the output path, so the
/// pipeline sees real files on disk.
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    /// Recorded operations.
    operations: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TranscodeError>>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder.
    pub fn new() -> Self {
        Self {
            operations: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded operations.
    pub async fn recorded_operations(&self) -> Vec<RecordedTranscode> {
        self.operations.read().await.clone()
    }

    /// Get the number of operations performed.
    pub async fn operation_count(&self) -> usize {
        self.operations.read().await.len()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TranscodeError) {
        *self.next_error.write().await = Some(error);
    }

    async fn run(
        &self,
        op: TranscodeOp,
        input: &Path,
        output: &Path,
    ) -> Result<TranscodeResult, TranscodeError> {
        let result = match self.next_error.write().await.take() {
            Some(err) => Err(err),
            None => Self::copy(input, output).await,
        };

        self.operations.write().await.push(RecordedTranscode {
            op,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            success: result.is_ok(),
        });

        result
    }

    async fn copy(input: &Path, output: &Path) -> Result<TranscodeResult, TranscodeError> {
        if !tokio::fs::try_exists(input).await? {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        let bytes = tokio::fs::copy(input, output).await?;
        Ok(TranscodeResult {
            output_path: output.to_path_buf(),
            output_size_bytes: bytes,
            duration_ms: 0,
        })
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn remux(&self, input: &Path, output: &Path) -> Result<TranscodeResult, TranscodeError> {
        self.run(TranscodeOp::Remux, input, output).await
    }

    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        bounds: SliceBounds,
    ) -> Result<TranscodeResult, TranscodeError> {
        self.run(TranscodeOp::Trim(bounds), input, output).await
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Ok(())
    }
}
