//! Transcoder module for normalizing and clipping fetched media.
//!
//! Two operations are needed by the item pipeline:
//! - Remux: repackage an alternate-container download into the canonical
//!   container (stream copy, audio re-encoded to AAC)
//! - Trim: cut a time range out of a canonical artifact
//!
//! Both run FFmpeg as a bounded subprocess and check its exit status.

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscodeError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{SliceBounds, TranscodeResult};
