//! Item manifests and archive resume.
//!
//! A manifest lists one item per line. The first whitespace-separated token is
//! either a watch URL or a bare id; everything after it (labels, timestamps) is
//! ignored. Blank lines and `#` comments are skipped.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashSet;
use std::path::Path;

use crate::storage::key_stem;

static WATCH_PARAM: Lazy<Regex> = Lazy::new(|| {
    // Literal pattern, cannot fail.
    Regex::new(r"[?&]v=([^&#\s]+)").unwrap()
});

/// Extracts an item id from a manifest token.
///
/// `https://www.youtube.com/watch?v=abc123&t=4` and `abc123` both yield
/// `abc123`; for other URLs the last path segment is used.
pub fn extract_item_id(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(caps) = WATCH_PARAM.captures(token) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    let without_query = token
        .split(['?', '#'])
        .next()
        .unwrap_or(token)
        .trim_end_matches('/');
    let id = without_query.rsplit('/').next().unwrap_or(without_query);
    if id.is_empty() || id.ends_with(':') {
        return None;
    }
    Some(id.to_string())
}

/// Parses manifest text into ids, dropping duplicates but keeping first-seen order.
pub fn parse_manifest(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        match extract_item_id(token) {
            Some(id) => {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            None => tracing::warn!(line, "Manifest line has no usable item id"),
        }
    }

    ids
}

/// Reads and parses a manifest file.
pub async fn load_manifest(path: &Path) -> std::io::Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path).await?;
    let ids = parse_manifest(&text);
    tracing::info!(path = %path.display(), items = ids.len(), "Loaded manifest");
    Ok(ids)
}

/// Drops ids whose artifact already appears among the archived entry names.
///
/// Entries match by file stem, so `out/cat1/abc123.mp4` covers id `abc123`.
/// Returns the remaining ids and how many were dropped.
pub fn filter_archived(ids: Vec<String>, archived: &[String]) -> (Vec<String>, usize) {
    let stored: HashSet<&str> = archived.iter().map(|name| key_stem(name)).collect();
    let before = ids.len();
    let remaining: Vec<String> = ids
        .into_iter()
        .filter(|id| !stored.contains(id.as_str()))
        .collect();
    let dropped = before - remaining.len();
    (remaining, dropped)
}
