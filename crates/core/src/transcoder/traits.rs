//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscodeError;
use super::types::{SliceBounds, TranscodeResult};

/// A transcoder that can remux and trim media files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Repackages `input` into the container implied by `output`'s extension.
    async fn remux(&self, input: &Path, output: &Path) -> Result<TranscodeResult, TranscodeError>;

    /// Cuts `bounds` out of `input` into `output`.
    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        bounds: SliceBounds,
    ) -> Result<TranscodeResult, TranscodeError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), TranscodeError>;
}
