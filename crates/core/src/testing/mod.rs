//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline's collaborator
//! traits, allowing full pool runs without external tools or a real bucket.
//!
//! # Example
//!
//! ```rust,ignore
//! use clipharvest_core::testing::{MockFetcher, MockObjectStore, MockTranscoder};
//!
//! let fetcher = MockFetcher::new();
//! let transcoder = MockTranscoder::new();
//! let store = MockObjectStore::new();
//!
//! // Configure mock behavior
//! fetcher.fail_for("vid001").await;
//!
//! // Build an ItemProcessor from clones and run the pool...
//! ```

mod mock_fetcher;
mod mock_store;
mod mock_transcoder;

pub use mock_fetcher::{MockFetchOutput, MockFetcher};
pub use mock_store::{MockObjectStore, RecordedUpload};
pub use mock_transcoder::{MockTranscoder, RecordedTranscode, TranscodeOp};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Create empty source files `root/<dir>/<name>` and return their paths.
    pub fn source_files(root: &Path, dir: &str, names: &[&str]) -> Vec<PathBuf> {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).expect("create source dir");
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                std::fs::write(&path, b"").expect("create source file");
                path
            })
            .collect()
    }

    /// Write a manifest file with one entry per line.
    pub fn manifest(path: &Path, lines: &[&str]) -> PathBuf {
        std::fs::write(path, lines.join("\n")).expect("write manifest");
        path.to_path_buf()
    }
}
