use super::{types::Config, ConfigError};
use crate::storage::StorageBackend;

/// Validate configuration
/// Currently validates:
/// - Pool has at least one worker and a non-empty queue
/// - Tool timeouts are not 0
/// - Formats are set and the archive key keeps at least one segment
/// - The S3 section exists (with a bucket) when S3 is the backend
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Pool validation
    if config.pool.num_workers == 0 {
        return Err(ConfigError::ValidationError(
            "pool.num_workers must be at least 1".to_string(),
        ));
    }
    if config.pool.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "pool.queue_capacity must be at least 1".to_string(),
        ));
    }

    // Tool validation
    if config.fetcher.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetcher.timeout_secs cannot be 0".to_string(),
        ));
    }
    if !config.fetcher.url_template.contains("{id}") {
        return Err(ConfigError::ValidationError(
            "fetcher.url_template must contain {id}".to_string(),
        ));
    }
    if config.transcoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "transcoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Processor validation
    let processor = &config.processor;
    if processor.format.trim().is_empty() || processor.alternate_format.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "processor.format and processor.alternate_format cannot be empty".to_string(),
        ));
    }
    if processor.format == processor.alternate_format {
        return Err(ConfigError::ValidationError(
            "processor.alternate_format must differ from processor.format".to_string(),
        ));
    }
    if processor.archive_key_depth == 0 {
        return Err(ConfigError::ValidationError(
            "processor.archive_key_depth must be at least 1".to_string(),
        ));
    }

    // Storage validation
    if config.storage.backend == StorageBackend::S3 {
        match &config.storage.s3 {
            None => {
                return Err(ConfigError::ValidationError(
                    "storage.s3 section is required when storage.backend = \"s3\"".to_string(),
                ))
            }
            Some(s3) if s3.bucket.trim().is_empty() => {
                return Err(ConfigError::ValidationError(
                    "storage.s3.bucket cannot be empty".to_string(),
                ))
            }
            Some(_) => {}
        }
    }

    Ok(())
}
