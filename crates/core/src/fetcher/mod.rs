//! Fetcher module for acquiring remote media items.
//!
//! This module provides the `Fetcher` trait and a `youtube-dl` compatible
//! implementation that downloads one item per invocation.
//!
//! # Example
//!
//! ```ignore
//! use clipharvest_core::fetcher::{FetchRequest, Fetcher, FetcherConfig, YoutubeDlFetcher};
//!
//! let fetcher = YoutubeDlFetcher::new(FetcherConfig::default());
//! fetcher.validate().await?;
//!
//! let result = fetcher
//!     .fetch(&FetchRequest {
//!         item_id: "dQw4w9WgXcQ".to_string(),
//!         format: "mp4".to_string(),
//!         output_path: PathBuf::from("/data/clips/dQw4w9WgXcQ.mp4"),
//!     })
//!     .await?;
//! println!("Fetched in {} ms", result.duration_ms);
//! ```

mod config;
mod error;
mod traits;
mod youtube_dl;

pub use config::FetcherConfig;
pub use error::FetchError;
pub use traits::{FetchRequest, FetchResult, Fetcher};
pub use youtube_dl::YoutubeDlFetcher;
