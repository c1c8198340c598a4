pub mod config;
pub mod exec;
pub mod fetcher;
pub mod manifest;
pub mod metrics;
pub mod pool;
pub mod processor;
pub mod storage;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    LoggingConfig,
};
pub use fetcher::{FetchError, Fetcher, FetcherConfig, YoutubeDlFetcher};
pub use pool::{JobConfig, PoolConfig, PoolController, PoolError, PoolReport};
pub use processor::{ItemOutcome, ItemProcessor, ProcessError, ProcessorConfig, WorkRequest};
pub use storage::{create_object_store, ObjectStore, StorageConfig, StorageError};
pub use transcoder::{FfmpegTranscoder, SliceBounds, TranscodeError, Transcoder, TranscoderConfig};
