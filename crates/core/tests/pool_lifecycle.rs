//! Pool lifecycle integration tests.
//!
//! These tests drive the full pool (feeder, workers, failure logger) with
//! mock collaborators:
//! - Category scenarios with archival and cleanup
//! - Sentinel accounting and at-most-once processing
//! - Failure isolation, including panicking items
//! - Skip behavior for already-processed items

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use clipharvest_core::{
    pool::{JobConfig, PoolConfig, PoolController},
    processor::{ItemProcessor, ProcessorConfig},
    testing::{fixtures, MockFetcher, MockObjectStore, MockTranscoder},
};

/// Test helper wiring a pool to mock collaborators.
struct TestHarness {
    fetcher: MockFetcher,
    transcoder: MockTranscoder,
    store: MockObjectStore,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            fetcher: MockFetcher::new(),
            transcoder: MockTranscoder::new(),
            store: MockObjectStore::new(),
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn source_root(&self) -> PathBuf {
        self.temp_dir.path().join("src")
    }

    fn target_root(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    fn failure_log(&self) -> PathBuf {
        self.temp_dir.path().join("failed.txt")
    }

    fn job(&self) -> JobConfig {
        JobConfig::new(self.source_root(), self.target_root())
    }

    fn controller(&self, pool: PoolConfig, job: JobConfig) -> PoolController {
        self.controller_with(pool, job, ProcessorConfig::default())
    }

    fn controller_with(
        &self,
        pool: PoolConfig,
        job: JobConfig,
        processor: ProcessorConfig,
    ) -> PoolController {
        let store = Arc::new(self.store.clone());
        let processor = ItemProcessor::new(
            processor.with_settle_delay(Duration::ZERO),
            Arc::new(self.fetcher.clone()),
            Arc::new(self.transcoder.clone()),
            store.clone(),
        );
        PoolController::new(pool, job, Arc::new(processor), store)
    }

    fn read_failure_log(&self) -> String {
        std::fs::read_to_string(self.failure_log()).expect("failure log exists")
    }
}

/// Keys for flat runs are `out/<file>`.
fn flat() -> ProcessorConfig {
    ProcessorConfig::default().with_archive_key_depth(2)
}

#[tokio::test]
async fn test_categories_archived_and_cleaned_up() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["vid001.mp4"]);
    fixtures::source_files(&h.source_root(), "cat2", &["vid001.mp4"]);

    let pool = PoolConfig::default()
        .with_workers(2)
        .with_failure_log(h.failure_log());
    let job = h.job().with_categories(["cat1", "cat2"]);

    let report = h.controller(pool, job).run().await.unwrap();

    assert_eq!(
        h.store.keys().await,
        vec!["out/cat1/vid001.mp4", "out/cat2/vid001.mp4"]
    );
    assert!(!h.target_root().join("cat1/vid001.mp4").exists());
    assert!(!h.target_root().join("cat2/vid001.mp4").exists());
    assert_eq!(h.read_failure_log(), "");
    assert_eq!(report.completed(), 2);
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_failure_in_one_category_is_logged_once() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["vid001.mp4"]);
    fixtures::source_files(&h.source_root(), "cat2", &["vid001.mp4"]);
    h.fetcher
        .fail_for_path(h.target_root().join("cat2").join("vid001.mp4"))
        .await;

    let pool = PoolConfig::default()
        .with_workers(2)
        .with_failure_log(h.failure_log());
    let job = h.job().with_categories(["cat1", "cat2"]);

    let report = h.controller(pool, job).run().await.unwrap();

    assert_eq!(h.store.keys().await, vec!["out/cat1/vid001.mp4"]);
    assert_eq!(h.read_failure_log(), "vid001\n");
    assert_eq!(report.completed(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failure_log.as_ref().map(|l| l.written), Some(1));
}

#[tokio::test]
async fn test_every_item_processed_once_and_sentinels_accounted() {
    let h = TestHarness::new();
    let names: Vec<String> = (0..50).map(|i| format!("item{:03}.mp4", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    fixtures::source_files(h.temp_dir.path(), "src", &refs);
    h.fetcher.set_fetch_duration(Duration::from_millis(2)).await;

    let pool = PoolConfig::default()
        .with_workers(4)
        .with_failure_log(h.failure_log());

    let report = h.controller(pool, h.job()).run().await.unwrap();

    let mut fetched = h.fetcher.fetched_ids().await;
    fetched.sort();
    let expected: Vec<String> = (0..50).map(|i| format!("item{:03}", i)).collect();
    assert_eq!(fetched, expected);

    assert_eq!(report.feed.enqueued, 50);
    assert_eq!(report.feed.sentinels, 4);
    assert_eq!(report.processed(), 50);
    assert_eq!(report.workers.len(), 4);
    assert_eq!(report.sentinels_consumed(), 4);
    assert_eq!(report.lost_workers, 0);
    assert!(report.failure_log.unwrap().shutdown_received);
    assert_eq!(h.store.keys().await.len(), 50);
}

#[tokio::test]
async fn test_failures_do_not_affect_later_items() {
    let h = TestHarness::new();
    fixtures::source_files(
        h.temp_dir.path(),
        "src",
        &["a.mp4", "b.mp4", "c.mp4", "d.mp4", "e.mp4"],
    );
    h.fetcher.fail_for("b").await;
    h.fetcher.panic_for("c").await;

    let pool = PoolConfig::default()
        .with_workers(1)
        .with_failure_log(h.failure_log());

    let report = h.controller_with(pool, h.job(), flat()).run().await.unwrap();

    assert_eq!(report.completed(), 3);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.workers[0].panicked, 1);
    assert!(report.workers[0].shutdown_received);
    assert_eq!(h.read_failure_log(), "b\nc\n");
    assert_eq!(
        h.store.keys().await,
        vec!["out/a.mp4", "out/d.mp4", "out/e.mp4"]
    );
}

#[tokio::test]
async fn test_existing_clip_is_skipped_without_fetch() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["done.mp4", "todo.mp4"]);
    let target = h.target_root().join("cat1");
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("done.clip.mp4"), b"clip").unwrap();

    let pool = PoolConfig::default().with_workers(2);
    let job = h.job().with_categories(["cat1"]);

    let report = h.controller(pool, job).run().await.unwrap();

    assert_eq!(report.skipped(), 1);
    assert_eq!(report.completed(), 1);
    assert_eq!(h.fetcher.fetched_ids().await, vec!["todo"]);
}

#[tokio::test]
async fn test_skip_existing_categories() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["vid001.mp4"]);
    fixtures::source_files(&h.source_root(), "cat2", &["vid002.mp4"]);
    std::fs::create_dir_all(h.target_root().join("cat1")).unwrap();

    let job = h
        .job()
        .with_categories(["cat1", "cat2"])
        .with_skip_existing(true);

    let report = h.controller(PoolConfig::default(), job).run().await.unwrap();

    assert_eq!(report.feed.skipped_categories, vec!["cat1"]);
    assert_eq!(h.fetcher.fetched_ids().await, vec!["vid002"]);
}

#[tokio::test]
async fn test_failures_without_failure_log() {
    let h = TestHarness::new();
    fixtures::source_files(h.temp_dir.path(), "src", &["x.mp4", "y.mp4"]);
    h.fetcher.fail_for("x").await;

    let pool = PoolConfig::default().with_workers(2);
    let report = h.controller_with(pool, h.job(), flat()).run().await.unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(h.store.keys().await, vec!["out/y.mp4"]);
    assert_eq!(report.completed(), 1);
    assert!(report.failure_log.is_none());
    assert!(!h.failure_log().exists());
}

#[tokio::test]
async fn test_tiny_queue_applies_backpressure_without_loss() {
    let h = TestHarness::new();
    let names: Vec<String> = (0..20).map(|i| format!("bp{:02}.mp4", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    fixtures::source_files(h.temp_dir.path(), "src", &refs);
    h.fetcher.set_fetch_duration(Duration::from_millis(5)).await;

    let mut pool = PoolConfig::default().with_workers(3);
    pool.queue_capacity = 1;

    let report = h.controller(pool, h.job()).run().await.unwrap();

    assert_eq!(report.processed(), 20);
    assert_eq!(report.sentinels_consumed(), 3);
    assert_eq!(h.fetcher.fetch_count().await, 20);
}

#[tokio::test]
async fn test_rerun_after_failure_completes_item() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["vid001.mp4"]);
    let canonical = h.target_root().join("cat1").join("vid001.mp4");
    h.fetcher.fail_for_path(&canonical).await;

    let pool = PoolConfig::default().with_failure_log(h.failure_log());
    let job = h.job().with_categories(["cat1"]);

    let first = h.controller(pool.clone(), job.clone()).run().await.unwrap();
    assert_eq!(first.failed(), 1);
    assert_eq!(h.read_failure_log(), "vid001\n");

    // Operator fixes the cause and reruns; the log keeps growing by append.
    let h2 = TestHarness {
        fetcher: MockFetcher::new(),
        transcoder: h.transcoder.clone(),
        store: h.store.clone(),
        temp_dir: h.temp_dir,
    };
    let second = h2.controller(pool, job).run().await.unwrap();
    assert_eq!(second.completed(), 1);
    assert_eq!(h2.store.keys().await, vec!["out/cat1/vid001.mp4"]);
    assert_eq!(h2.read_failure_log(), "vid001\n");
    assert!(!canonical.exists());
}

#[tokio::test]
async fn test_rerun_skips_items_already_archived() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["vid001.mp4"]);
    fixtures::source_files(&h.source_root(), "cat2", &["vid001.mp4"]);
    h.fetcher
        .fail_for_path(h.target_root().join("cat2").join("vid001.mp4"))
        .await;
    let job = h.job().with_categories(["cat1", "cat2"]);

    let first = h.controller(PoolConfig::default(), job.clone()).run().await.unwrap();
    assert_eq!(first.completed(), 1);
    assert_eq!(h.store.keys().await, vec!["out/cat1/vid001.mp4"]);

    // Only the item missing from the archive is fetched again.
    let second = h.controller(PoolConfig::default(), job).run().await.unwrap();
    assert_eq!(second.feed.already_archived, 1);
    assert_eq!(second.feed.enqueued, 1);
    assert_eq!(h.fetcher.fetch_count().await, 3);
    assert_eq!(h.store.recorded_uploads().await.len(), 1);
}

#[tokio::test]
async fn test_rerun_without_resume_fetches_everything() {
    let h = TestHarness::new();
    fixtures::source_files(&h.source_root(), "cat1", &["vid001.mp4"]);
    let mut job = h.job().with_categories(["cat1"]);
    job.resume = false;

    h.controller(PoolConfig::default(), job.clone()).run().await.unwrap();
    let second = h.controller(PoolConfig::default(), job).run().await.unwrap();

    assert_eq!(second.feed.already_archived, 0);
    assert_eq!(h.fetcher.fetch_count().await, 2);
}
