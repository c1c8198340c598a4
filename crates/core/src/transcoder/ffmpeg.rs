//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::path::Path;
use tokio::time::Duration;

use super::config::TranscoderConfig;
use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{SliceBounds, TranscodeResult};
use crate::exec::{ToolInvocation, ToolOutput};

/// FFmpeg-based transcoder implementation.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds ffmpeg arguments for a container remux.
    fn build_remux_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-map".to_string(),
            "0".to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            output.to_string_lossy().to_string(),
            "-strict".to_string(),
            "-2".to_string(),
            "-loglevel".to_string(),
            self.config.remux_log_level.clone(),
        ]
    }

    /// Builds ffmpeg arguments for cutting a time range.
    fn build_trim_args(&self, input: &Path, output: &Path, bounds: SliceBounds) -> Vec<String> {
        vec![
            "-loglevel".to_string(),
            self.config.trim_log_level.clone(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-strict".to_string(),
            "-2".to_string(),
            "-ss".to_string(),
            bounds.start_secs.to_string(),
            "-to".to_string(),
            bounds.end_secs.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    async fn run_ffmpeg(&self, tool: &str, args: Vec<String>) -> Result<ToolOutput, TranscodeError> {
        let output = ToolInvocation::new(
            tool,
            &self.config.ffmpeg_path,
            Duration::from_secs(self.config.timeout_secs),
        )
        .args(args)
        .with_stderr_log(self.config.tool_log.clone())
        .run()
        .await?;
        Ok(output)
    }

    /// Checks the input exists before spending a subprocess on it.
    async fn ensure_input(input: &Path) -> Result<(), TranscodeError> {
        if !tokio::fs::try_exists(input).await? {
            return Err(TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Verifies output exists and builds the result.
    async fn finish(output: &Path, tool_output: ToolOutput) -> Result<TranscodeResult, TranscodeError> {
        let meta = tokio::fs::metadata(output)
            .await
            .map_err(|_| TranscodeError::OutputMissing {
                path: output.to_path_buf(),
            })?;

        Ok(TranscodeResult {
            output_path: output.to_path_buf(),
            output_size_bytes: meta.len(),
            duration_ms: tool_output.duration_ms,
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn remux(&self, input: &Path, output: &Path) -> Result<TranscodeResult, TranscodeError> {
        Self::ensure_input(input).await?;
        let tool_output = self
            .run_ffmpeg("remux", self.build_remux_args(input, output))
            .await?;
        Self::finish(output, tool_output).await
    }

    async fn trim(
        &self,
        input: &Path,
        output: &Path,
        bounds: SliceBounds,
    ) -> Result<TranscodeResult, TranscodeError> {
        Self::ensure_input(input).await?;
        let tool_output = self
            .run_ffmpeg("trim", self.build_trim_args(input, output, bounds))
            .await?;
        Self::finish(output, tool_output).await
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        self.run_ffmpeg("ffmpeg", vec!["-version".to_string()])
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ToolError;
    use std::path::PathBuf;

    #[test]
    fn test_build_remux_args() {
        let transcoder = FfmpegTranscoder::with_defaults();
        let args = transcoder.build_remux_args(Path::new("/d/abc.mkv"), Path::new("/d/abc.mp4"));

        assert_eq!(
            args,
            vec![
                "-y", "-i", "/d/abc.mkv", "-map", "0", "-c", "copy", "-c:a", "aac", "/d/abc.mp4",
                "-strict", "-2", "-loglevel", "fatal",
            ]
        );
    }

    #[test]
    fn test_build_trim_args() {
        let transcoder = FfmpegTranscoder::with_defaults();
        let bounds = SliceBounds::new(0.0, 12.5).unwrap();
        let args = transcoder.build_trim_args(
            Path::new("/d/abc.mp4"),
            Path::new("/d/abc.clip.mp4"),
            bounds,
        );

        assert_eq!(
            args,
            vec![
                "-loglevel",
                "quiet",
                "-i",
                "/d/abc.mp4",
                "-strict",
                "-2",
                "-ss",
                "0",
                "-to",
                "12.5",
                "/d/abc.clip.mp4",
            ]
        );
    }

    #[tokio::test]
    async fn test_remux_missing_input() {
        let transcoder = FfmpegTranscoder::with_defaults();
        let err = transcoder
            .remux(Path::new("/nonexistent/abc.mkv"), Path::new("/tmp/abc.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_binary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("abc.mkv");
        std::fs::write(&input, b"not really matroska").unwrap();

        let transcoder = FfmpegTranscoder::new(TranscoderConfig::with_ffmpeg_path(
            PathBuf::from("/nonexistent/ffmpeg"),
        ));
        let err = transcoder
            .remux(&input, &dir.path().join("abc.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Tool(ToolError::NotFound { .. })));
    }
}
