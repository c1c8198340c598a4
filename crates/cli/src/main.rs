mod args;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clipharvest_core::{
    create_object_store, load_config, metrics, validate_config, Config, FfmpegTranscoder, Fetcher,
    ItemProcessor, LogFormat, LoggingConfig, ObjectStore, PoolController, Transcoder,
    YoutubeDlFetcher,
};

use args::{resolve_config_path, Cli, Command, RunArgs, CONFIG_ENV};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config, std::env::var(CONFIG_ENV).ok());
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    if let Command::Run(run_args) = &cli.command {
        run_args.apply(&mut config);
    }

    init_logging(&config.logging);
    info!(version = VERSION, config = ?config_path, "Starting clipharvest");

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(config_hash = &config_hash[..16], "Configuration loaded");

    match cli.command {
        Command::Run(run_args) => run_batch(config, &run_args).await,
        Command::Check => check(&config).await,
        Command::List { prefix } => list(&config, prefix.as_deref()).await,
        Command::Restore { key, destination } => restore(&config, &key, &destination).await,
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run_batch(config: Config, run_args: &RunArgs) -> Result<()> {
    if run_args.overwrite {
        warn!("Overwrite enabled: existing clips will be replaced");
    }

    let store = create_object_store(&config.storage)
        .await
        .context("Failed to create object store")?;
    info!("Using object store: {}", store.name());

    let fetcher = Arc::new(YoutubeDlFetcher::new(config.fetcher.clone()));
    let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
    let processor = ItemProcessor::new(
        config.processor.clone(),
        fetcher,
        transcoder,
        Arc::clone(&store),
    );

    let controller = PoolController::new(
        config.pool.clone(),
        config.job.clone(),
        Arc::new(processor),
        store,
    );
    let result = controller.run().await;

    // Written even when the run failed, so partial progress is visible.
    if let Some(path) = &config.metrics_path {
        write_metrics(path).await;
    }

    let report = result.context("Batch run failed")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
    );
    Ok(())
}

async fn check(config: &Config) -> Result<()> {
    let fetcher = YoutubeDlFetcher::new(config.fetcher.clone());
    fetcher
        .validate()
        .await
        .with_context(|| format!("Fetch tool unusable: {:?}", config.fetcher.binary))?;
    info!("Fetch tool OK: {}", fetcher.name());

    let transcoder = FfmpegTranscoder::new(config.transcoder.clone());
    transcoder
        .validate()
        .await
        .with_context(|| format!("ffmpeg unusable: {:?}", config.transcoder.ffmpeg_path))?;
    info!("Transcoder OK: {}", transcoder.name());

    let store = create_object_store(&config.storage)
        .await
        .context("Failed to create object store")?;
    let names = store
        .list_names(None)
        .await
        .context("Object store is not reachable")?;
    info!(objects = names.len(), "Object store OK: {}", store.name());
    Ok(())
}

async fn list(config: &Config, prefix: Option<&str>) -> Result<()> {
    let store = create_object_store(&config.storage)
        .await
        .context("Failed to create object store")?;
    let names = store
        .list_names(prefix)
        .await
        .context("Failed to list archived objects")?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

async fn restore(config: &Config, key: &str, destination: &Path) -> Result<()> {
    let store: Arc<dyn ObjectStore> = create_object_store(&config.storage)
        .await
        .context("Failed to create object store")?;
    store
        .download(key, destination)
        .await
        .with_context(|| format!("Failed to restore {} to {:?}", key, destination))?;
    info!(key, destination = %destination.display(), "Restored object");
    Ok(())
}

async fn write_metrics(path: &Path) {
    if let Err(e) = tokio::fs::write(path, metrics::gather_text()).await {
        warn!("Failed to write metrics to {:?}: {}", path, e);
    }
}
