//! Per-item acquisition pipeline.
//!
//! The `ItemProcessor` drives one work request through:
//! - Fetch: download the remote item, unless an alternate-container download
//!   is already on disk
//! - Remux: normalize the alternate container into the canonical one
//! - Archive: upload the canonical artifact to the object store
//! - Trim: cut the requested time slice into the clip output
//! - Cleanup: remove the local canonical artifact once archived
//!
//! Re-running an item is safe. Stray downloads are removed before fetching, and
//! an existing clip output or sidecar marks the item as already done.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clipharvest_core::processor::{ItemProcessor, ProcessorConfig, WorkRequest};
//!
//! let processor = ItemProcessor::new(
//!     ProcessorConfig::default(),
//!     Arc::new(fetcher),
//!     Arc::new(transcoder),
//!     store,
//! );
//!
//! let outcome = processor.process(&WorkRequest::new("vid001", "/data/out/cat1")).await?;
//! ```

mod config;
mod error;
mod inspector;
mod item;
mod types;

pub use config::ProcessorConfig;
pub use error::ProcessError;
pub use inspector::{ArtifactInspector, FsArtifactInspector};
pub use item::ItemProcessor;
pub use types::{ArtifactPaths, ItemOutcome, SkipReason, WorkRequest};
