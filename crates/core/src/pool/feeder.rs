//! Feeder: turns a job description into work requests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::processor::WorkRequest;
use crate::storage::archive_key;

use super::config::{category_dir_name, JobConfig};
use super::error::PoolError;
use super::queue::WorkSender;
use super::types::FeedReport;

/// Archive keys present before the run, used to skip finished items.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    keys: HashSet<String>,
    format: String,
    depth: usize,
}

impl ArchiveIndex {
    /// `format` and `depth` must match the processor that uploads the items.
    pub fn new(keys: impl IntoIterator<Item = String>, format: impl Into<String>, depth: usize) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            format: format.into(),
            depth,
        }
    }

    /// Whether the canonical artifact of `item_id` in `target_dir` is archived.
    pub fn contains(&self, item_id: &str, target_dir: &Path) -> bool {
        let artifact = target_dir.join(format!("{}.{}", item_id, self.format));
        archive_key(&artifact, self.depth).is_some_and(|key| self.keys.contains(&key))
    }
}

/// Publishes one work request per item, then the worker sentinels.
///
/// Each item is published at most once per feeder, so no two workers touch
/// the same local artifact in a run. An item is an id within a target
/// directory: `cat1/vid001` and `cat2/vid001` are distinct.
pub struct Feeder {
    sender: WorkSender,
    seen: HashSet<(String, PathBuf)>,
    archived: Option<ArchiveIndex>,
    report: FeedReport,
}

impl Feeder {
    pub fn new(sender: WorkSender) -> Self {
        Self {
            sender,
            seen: HashSet::new(),
            archived: None,
            report: FeedReport::default(),
        }
    }

    /// Drops items whose artifact already has an archive key.
    pub fn with_archive_index(mut self, index: ArchiveIndex) -> Self {
        self.archived = Some(index);
        self
    }

    /// Feeds a directory job: a flat listing of `source_root`, or one
    /// subdirectory per category.
    pub async fn feed_job(&mut self, job: &JobConfig) -> Result<(), PoolError> {
        if job.categories.is_empty() {
            self.feed_directory(&job.source_root, &job.target_root).await
        } else {
            self.feed_categories(job).await
        }
    }

    /// Feeds every regular file in `source_dir` into `target_dir`.
    pub async fn feed_directory(
        &mut self,
        source_dir: &Path,
        target_dir: &Path,
    ) -> Result<(), PoolError> {
        let names = list_file_names(source_dir).await?;
        tracing::debug!(source = %source_dir.display(), files = names.len(), "Listed source directory");

        for name in names {
            match item_id_from_file_name(&name) {
                Some(item_id) => self.enqueue(item_id, target_dir).await?,
                None => {
                    self.report.ignored_entries += 1;
                    tracing::warn!(file = %name, "Source file has no item id, ignoring");
                }
            }
        }
        Ok(())
    }

    /// Feeds each category's source subdirectory into its target subdirectory.
    pub async fn feed_categories(&mut self, job: &JobConfig) -> Result<(), PoolError> {
        for category in &job.categories {
            let dir_name = category_dir_name(category);
            let source_dir = job.source_root.join(&dir_name);
            let target_dir = job.target_root.join(&dir_name);

            if job.skip_existing_categories && tokio::fs::try_exists(&target_dir).await? {
                tracing::info!(category = %category, "Target exists, skipping category");
                self.report.skipped_categories.push(category.clone());
                continue;
            }

            if !tokio::fs::try_exists(&source_dir).await? {
                tracing::warn!(category = %category, source = %source_dir.display(), "No source directory for category");
                self.report.skipped_categories.push(category.clone());
                continue;
            }

            // Concurrent runs may create it between the check and here; that is fine.
            tokio::fs::create_dir_all(&target_dir).await?;

            tracing::info!(category = %category, "Feeding category");
            self.feed_directory(&source_dir, &target_dir).await?;
        }
        Ok(())
    }

    /// Feeds manifest ids into the target root, or into the manifest category
    /// subdirectory. The category obeys the same skip policy as directory jobs.
    pub async fn feed_manifest(&mut self, ids: &[String], job: &JobConfig) -> Result<(), PoolError> {
        let Some(category) = &job.manifest_category else {
            return self.feed_ids(ids, &job.target_root).await;
        };

        let target_dir = job.target_root.join(category_dir_name(category));
        if job.skip_existing_categories && tokio::fs::try_exists(&target_dir).await? {
            tracing::info!(category = %category, "Target exists, skipping manifest category");
            self.report.skipped_categories.push(category.clone());
            return Ok(());
        }
        self.feed_ids(ids, &target_dir).await
    }

    /// Feeds a list of item ids into `target_dir`.
    pub async fn feed_ids(&mut self, ids: &[String], target_dir: &Path) -> Result<(), PoolError> {
        tokio::fs::create_dir_all(target_dir).await?;
        for item_id in ids {
            self.enqueue(item_id.clone(), target_dir).await?;
        }
        Ok(())
    }

    /// Records manifest ids dropped by the resume filter.
    pub fn record_already_archived(&mut self, count: usize) {
        self.report.already_archived += count;
    }

    /// Publishes one shutdown sentinel per worker.
    pub async fn shutdown_workers(&mut self, num_workers: usize) -> Result<(), PoolError> {
        for _ in 0..num_workers {
            self.sender.shutdown().await?;
            self.report.sentinels += 1;
        }
        Ok(())
    }

    /// Finishes feeding and returns the counters.
    pub fn finish(self) -> FeedReport {
        self.report
    }

    async fn enqueue(&mut self, item_id: String, target_dir: &Path) -> Result<(), PoolError> {
        let target_dir = target_dir.to_path_buf();
        if !self.seen.insert((item_id.clone(), target_dir.clone())) {
            self.report.duplicates += 1;
            tracing::debug!(item_id = %item_id, "Duplicate item, not enqueued");
            return Ok(());
        }
        if self
            .archived
            .as_ref()
            .is_some_and(|index| index.contains(&item_id, &target_dir))
        {
            self.report.already_archived += 1;
            tracing::debug!(item_id = %item_id, target = %target_dir.display(), "Already archived, not enqueued");
            return Ok(());
        }
        self.sender
            .send(WorkRequest::new(item_id, target_dir))
            .await?;
        self.report.enqueued += 1;
        Ok(())
    }
}

/// Item id for a source file name: the name without its last extension.
///
/// Names without an extension, or whose stem is empty (`.hidden`), have none.
pub fn item_id_from_file_name(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => Some(stem.to_string()),
        _ => None,
    }
}

/// Regular file names in `dir`, sorted.
async fn list_file_names(dir: &Path) -> Result<Vec<String>, PoolError> {
    let listing_error = |source: std::io::Error| PoolError::Listing {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(listing_error)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(listing_error)? {
        if entry.file_type().await.map_err(listing_error)?.is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::queue::{work_queue, WorkMessage, WorkReceiver};
    use crate::testing::fixtures;
    use tempfile::TempDir;

    async fn drain(rx: &WorkReceiver) -> Vec<WorkMessage> {
        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        messages
    }

    fn work(item_id: &str, dir: &Path) -> WorkMessage {
        WorkMessage::Work(WorkRequest::new(item_id, dir))
    }

    #[test]
    fn test_item_id_from_file_name() {
        assert_eq!(item_id_from_file_name("vid001.mp4").as_deref(), Some("vid001"));
        assert_eq!(item_id_from_file_name("a.b.mp4").as_deref(), Some("a.b"));
        assert_eq!(item_id_from_file_name("README"), None);
        assert_eq!(item_id_from_file_name(".hidden"), None);
    }

    #[tokio::test]
    async fn test_flat_feed_then_sentinels() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        let target = temp.path().join("out");
        fixtures::source_files(temp.path(), "src", &["b.mp4", "a.mp4", "notes"]);
        std::fs::create_dir_all(source.join("nested")).unwrap();

        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);
        feeder.feed_job(&JobConfig::new(&source, &target)).await.unwrap();
        feeder.shutdown_workers(2).await.unwrap();
        let report = feeder.finish();

        assert_eq!(
            drain(&rx).await,
            vec![
                work("a", &target),
                work("b", &target),
                WorkMessage::Shutdown,
                WorkMessage::Shutdown,
            ]
        );
        assert_eq!(report.enqueued, 2);
        assert_eq!(report.ignored_entries, 1);
        assert_eq!(report.sentinels, 2);
    }

    #[tokio::test]
    async fn test_categories_create_targets_and_replace_spaces() {
        let temp = TempDir::new().unwrap();
        fixtures::source_files(&temp.path().join("src"), "playing_guitar", &["g1.mp4"]);
        fixtures::source_files(&temp.path().join("src"), "cat2", &["c1.mp4"]);
        let target = temp.path().join("out");

        let job = JobConfig::new(temp.path().join("src"), &target)
            .with_categories(["playing guitar", "cat2", "missing"]);

        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);
        feeder.feed_job(&job).await.unwrap();
        let report = feeder.finish();

        assert!(target.join("playing_guitar").is_dir());
        assert!(target.join("cat2").is_dir());
        assert!(!target.join("missing").exists());
        assert_eq!(report.skipped_categories, vec!["missing"]);
        assert_eq!(
            drain(&rx).await,
            vec![
                work("g1", &target.join("playing_guitar")),
                work("c1", &target.join("cat2")),
            ]
        );
    }

    #[tokio::test]
    async fn test_skip_existing_categories() {
        let temp = TempDir::new().unwrap();
        fixtures::source_files(&temp.path().join("src"), "cat1", &["v1.mp4"]);
        fixtures::source_files(&temp.path().join("src"), "cat2", &["v2.mp4"]);
        let target = temp.path().join("out");
        std::fs::create_dir_all(target.join("cat1")).unwrap();

        let job = JobConfig::new(temp.path().join("src"), &target)
            .with_categories(["cat1", "cat2"])
            .with_skip_existing(true);

        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);
        feeder.feed_job(&job).await.unwrap();
        let report = feeder.finish();

        assert_eq!(report.skipped_categories, vec!["cat1"]);
        assert_eq!(drain(&rx).await, vec![work("v2", &target.join("cat2"))]);
    }

    #[tokio::test]
    async fn test_duplicate_items_fed_once() {
        let temp = TempDir::new().unwrap();
        fixtures::source_files(&temp.path().join("src"), "cat1", &["vid001.mp4", "vid001.webm"]);
        fixtures::source_files(&temp.path().join("src"), "cat2", &["vid001.mp4"]);
        let target = temp.path().join("out");

        let job = JobConfig::new(temp.path().join("src"), &target)
            .with_categories(["cat1", "cat2", "cat1"]);

        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);
        feeder.feed_job(&job).await.unwrap();
        let report = feeder.finish();

        // Same id in another category is a different item.
        assert_eq!(report.enqueued, 2);
        assert_eq!(report.duplicates, 3);
        assert_eq!(
            drain(&rx).await,
            vec![
                work("vid001", &target.join("cat1")),
                work("vid001", &target.join("cat2")),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_source_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let (tx, _rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);

        let err = feeder
            .feed_job(&JobConfig::new(temp.path().join("nope"), temp.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::Listing { .. }));
    }

    #[test]
    fn test_archive_index_compares_full_keys() {
        let index = ArchiveIndex::new(vec!["out/cat1/vid001.mp4".to_string()], "mp4", 3);
        assert!(index.contains("vid001", Path::new("/data/out/cat1")));
        assert!(!index.contains("vid001", Path::new("/data/out/cat2")));
        assert!(!index.contains("vid002", Path::new("/data/out/cat1")));
    }

    #[tokio::test]
    async fn test_archived_items_are_not_enqueued() {
        let temp = TempDir::new().unwrap();
        fixtures::source_files(&temp.path().join("src"), "cat1", &["vid001.mp4", "vid002.mp4"]);
        fixtures::source_files(&temp.path().join("src"), "cat2", &["vid001.mp4"]);
        let target = temp.path().join("out");
        let job = JobConfig::new(temp.path().join("src"), &target).with_categories(["cat1", "cat2"]);
        let index = ArchiveIndex::new(vec!["out/cat1/vid001.mp4".to_string()], "mp4", 3);

        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx).with_archive_index(index);
        feeder.feed_job(&job).await.unwrap();
        let report = feeder.finish();

        assert_eq!(report.already_archived, 1);
        assert_eq!(report.enqueued, 2);
        assert_eq!(
            drain(&rx).await,
            vec![
                work("vid002", &target.join("cat1")),
                work("vid001", &target.join("cat2")),
            ]
        );
    }

    #[tokio::test]
    async fn test_manifest_category_obeys_skip_policy() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");
        std::fs::create_dir_all(target.join("cat1")).unwrap();
        let ids = vec!["aaa".to_string()];

        let job = JobConfig::new(temp.path().join("src"), &target)
            .with_manifest(temp.path().join("train.txt"))
            .with_manifest_category("cat1")
            .with_skip_existing(true);
        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);
        feeder.feed_manifest(&ids, &job).await.unwrap();
        let report = feeder.finish();

        assert_eq!(report.skipped_categories, vec!["cat1"]);
        assert_eq!(report.enqueued, 0);
        assert!(drain(&rx).await.is_empty());

        // Without the skip policy the same category is fed.
        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);
        feeder
            .feed_manifest(&ids, &job.clone().with_skip_existing(false))
            .await
            .unwrap();
        drop(feeder);
        assert_eq!(drain(&rx).await, vec![work("aaa", &target.join("cat1"))]);
    }

    #[tokio::test]
    async fn test_feed_ids() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");
        let (tx, rx) = work_queue(100);
        let mut feeder = Feeder::new(tx);

        feeder
            .feed_ids(&["x".to_string(), "y".to_string(), "x".to_string()], &target)
            .await
            .unwrap();
        let report = feeder.finish();

        assert!(target.is_dir());
        assert_eq!(report.enqueued, 2);
        assert_eq!(drain(&rx).await, vec![work("x", &target), work("y", &target)]);
    }
}
