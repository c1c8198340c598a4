//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use clipharvest_core::Config;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "CLIPHARVEST_CONFIG";

const DEFAULT_CONFIG: &str = "clipharvest.toml";

#[derive(Debug, Parser)]
#[command(
    name = "clipharvest",
    version,
    about = "Fetch, clip and archive media items in parallel"
)]
pub struct Cli {
    /// Config file; falls back to $CLIPHARVEST_CONFIG, then clipharvest.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a batch
    Run(RunArgs),
    /// Validate the configuration and probe the external tools
    Check,
    /// List archived object names
    List {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Copy an archived object back to local disk
    Restore { key: String, destination: PathBuf },
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Number of concurrent workers
    #[arg(long, short = 'n')]
    pub num_workers: Option<usize>,

    /// Comma-separated categories to process
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Directory holding the source listing
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Directory receiving local artifacts
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// File that collects failed item ids
    #[arg(long = "failed-log")]
    pub failed_log: Option<PathBuf>,

    /// Skip categories whose target directory already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Replace clips that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Run the compression step on each artifact
    #[arg(long)]
    pub compress: bool,

    /// Feed ids from a manifest instead of the source listing
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Category subdirectory for manifest items
    #[arg(long, requires = "manifest")]
    pub manifest_category: Option<String>,

    /// Feed every manifest id even if it is already archived
    #[arg(long, requires = "manifest")]
    pub no_resume: bool,
}

impl RunArgs {
    /// Applies command line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(n) = self.num_workers {
            config.pool.num_workers = n;
        }
        if let Some(path) = &self.failed_log {
            config.pool.failure_log = Some(path.clone());
        }
        if !self.categories.is_empty() {
            config.job.categories = self.categories.clone();
        }
        if let Some(source) = &self.source {
            config.job.source_root = source.clone();
        }
        if let Some(target) = &self.target {
            config.job.target_root = target.clone();
        }
        if self.skip_existing {
            config.job.skip_existing_categories = true;
        }
        if self.overwrite {
            config.processor.overwrite = true;
        }
        if self.compress {
            config.processor.compress = true;
        }
        if let Some(manifest) = &self.manifest {
            config.job.manifest = Some(manifest.clone());
        }
        if let Some(category) = &self.manifest_category {
            config.job.manifest_category = Some(category.clone());
        }
        if self.no_resume {
            config.job.resume = false;
        }
    }
}

/// Resolves the config path: flag, then environment, then the default name.
pub fn resolve_config_path(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "clipharvest",
            "--config",
            "job.toml",
            "run",
            "-n",
            "4",
            "--categories",
            "cat1,playing guitar",
            "--failed-log",
            "dataset/failed.txt",
            "--skip-existing",
            "--compress",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("job.toml")));
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.num_workers, Some(4));
        assert_eq!(args.categories, vec!["cat1", "playing guitar"]);
        assert!(args.skip_existing);
        assert!(args.compress);
        assert!(!args.overwrite);
    }

    #[test]
    fn test_manifest_category_requires_manifest() {
        let result = Cli::try_parse_from(["clipharvest", "run", "--manifest-category", "cat1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_restore() {
        let cli =
            Cli::try_parse_from(["clipharvest", "restore", "out/cat1/a.mp4", "/tmp/a.mp4"]).unwrap();
        match cli.command {
            Command::Restore { key, destination } => {
                assert_eq!(key, "out/cat1/a.mp4");
                assert_eq!(destination, PathBuf::from("/tmp/a.mp4"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let args = RunArgs {
            num_workers: Some(8),
            categories: vec!["cat1".to_string()],
            failed_log: Some(PathBuf::from("failed.txt")),
            overwrite: true,
            compress: true,
            manifest: Some(PathBuf::from("train.txt")),
            no_resume: true,
            ..RunArgs::default()
        };
        args.apply(&mut config);

        assert_eq!(config.pool.num_workers, 8);
        assert_eq!(config.pool.failure_log, Some(PathBuf::from("failed.txt")));
        assert_eq!(config.job.categories, vec!["cat1"]);
        assert!(config.processor.overwrite);
        assert!(config.processor.compress);
        assert!(!config.job.resume);
        assert!(!config.job.skip_existing_categories);
    }

    #[test]
    fn test_resolve_config_path() {
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("a.toml")), Some("b.toml".into())),
            PathBuf::from("a.toml")
        );
        assert_eq!(
            resolve_config_path(None, Some("b.toml".into())),
            PathBuf::from("b.toml")
        );
        assert_eq!(
            resolve_config_path(None, Some(String::new())),
            PathBuf::from("clipharvest.toml")
        );
        assert_eq!(resolve_config_path(None, None), PathBuf::from("clipharvest.toml"));
    }
}
