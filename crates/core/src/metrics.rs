//! Prometheus metrics for the acquisition pipeline.
//!
//! This module provides metrics for:
//! - Item processing (outcomes, durations)
//! - External tools (fetch, remux, trim invocations)
//! - Archive uploads
//! - Pool queues (enqueued items, logged failures)

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Registry holding every clipharvest metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in all_metrics() {
        if let Err(e) = registry.register(metric) {
            tracing::warn!("Failed to register metric: {}", e);
        }
    }
    registry
});

// =============================================================================
// Item Metrics
// =============================================================================

/// Items processed total by result.
pub static ITEMS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipharvest_items_processed_total", "Total items processed"),
        &["result"], // "completed", "skipped", "failed"
    )
    .unwrap()
});

/// Item processing duration in seconds.
pub static ITEM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "clipharvest_item_duration_seconds",
            "Duration of a full item pipeline",
        )
        .buckets(vec![0.1, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// External Tool Metrics
// =============================================================================

/// External tool invocations by tool and result.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "clipharvest_tool_invocations_total",
            "Total external tool invocations",
        ),
        &["tool", "result"], // result: "success", "failed", "timeout", "error"
    )
    .unwrap()
});

/// External tool run duration in seconds.
pub static TOOL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "clipharvest_tool_duration_seconds",
            "Duration of external tool runs",
        )
        .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
        &["tool"],
    )
    .unwrap()
});

// =============================================================================
// Archive Metrics
// =============================================================================

/// Archive uploads by result.
pub static UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("clipharvest_uploads_total", "Total archive uploads"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Pool Metrics
// =============================================================================

/// Work requests published to the work queue.
pub static ITEMS_ENQUEUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipharvest_items_enqueued_total",
        "Total work requests published to the work queue",
    )
    .unwrap()
});

/// Failed item ids written to the failure log.
pub static FAILURES_LOGGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "clipharvest_failures_logged_total",
        "Total failed item ids appended to the failure log",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ITEMS_PROCESSED.clone()),
        Box::new(ITEM_DURATION.clone()),
        Box::new(TOOL_INVOCATIONS.clone()),
        Box::new(TOOL_DURATION.clone()),
        Box::new(UPLOADS.clone()),
        Box::new(ITEMS_ENQUEUED.clone()),
        Box::new(FAILURES_LOGGED.clone()),
    ]
}

/// Render every registered metric in the Prometheus text format.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_text_contains_counters() {
        ITEMS_ENQUEUED.inc();
        UPLOADS.with_label_values(&["success"]).inc();

        let text = gather_text();
        assert!(text.contains("clipharvest_items_enqueued_total"));
        assert!(text.contains("clipharvest_uploads_total"));
    }
}
