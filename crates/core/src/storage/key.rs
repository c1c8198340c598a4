//! Object key helpers.

use std::path::{Component, Path};

use super::error::StorageError;

/// Strips leading slashes and rejects empty keys or keys with `..` segments.
pub fn normalize_key(key: &str) -> Result<String, StorageError> {
    let trimmed = key.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Builds the archive key for a local artifact from its last `depth` path
/// segments, e.g. `/data/out/cat1/vid001.mp4` at depth 3 is
/// `out/cat1/vid001.mp4`.
///
/// Returns `None` when the path has no usable segments or `depth` is zero.
pub fn archive_key(path: &Path, depth: usize) -> Option<String> {
    if depth == 0 {
        return None;
    }

    let segments: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return None;
    }

    let skip = segments.len().saturating_sub(depth);
    Some(segments[skip..].join("/"))
}

/// File stem of the last key segment (`cat1/vid001.mp4` -> `vid001`).
pub fn key_stem(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
