//! `ingest` subcommand
//!
//! Loads configuration, constructs the sink, runs the pipeline over the
//! given files, and closes the sink. Ctrl-C switches the run onto the
//! pipeline's abort path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use beamline_config::Config;
use beamline_pipeline::Pipeline;
use beamline_sinks::{EventSink, NullSink, PostgresSink, PostgresSinkConfig};

/// Default configuration file location
const DEFAULT_CONFIG_PATH: &str = "configs/beamline.toml";

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// CSV files to ingest
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the number of reader workers
    #[arg(long)]
    pub producers: Option<usize>,

    /// Override the number of consumer workers
    #[arg(long)]
    pub consumers: Option<usize>,

    /// Override the retention threshold in GeV
    #[arg(long)]
    pub energy_threshold: Option<f64>,

    /// Override the records-per-commit batch size
    #[arg(long)]
    pub batch_size: Option<usize>,
}

pub async fn run(args: IngestArgs, log_level: Option<String>) -> Result<()> {
    let config = load_config(&args.config)?;

    let level = log_level.unwrap_or_else(|| config.log.level.clone());
    crate::init_logging(&level)?;

    let mut pipeline_config = config.pipeline.to_pipeline_config();
    if let Some(producers) = args.producers {
        pipeline_config.producers = producers;
    }
    if let Some(consumers) = args.consumers {
        pipeline_config.consumers = consumers;
    }
    if let Some(threshold) = args.energy_threshold {
        pipeline_config.energy_threshold = threshold;
    }
    if let Some(batch_size) = args.batch_size {
        pipeline_config.batch_size = batch_size;
    }

    let sink = build_sink(&config).await?;

    // Ctrl-C triggers cooperative abort; a second Ctrl-C kills the process.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, shutting down");
                cancel.cancel();
            }
        });
    }

    let pipeline = Pipeline::new(pipeline_config, Arc::clone(&sink))
        .context("failed to construct pipeline")?;
    let report = pipeline
        .run(args.files, cancel)
        .await
        .context("pipeline run failed")?;

    sink.close().await.context("failed to close sink")?;

    if report.aborted {
        tracing::warn!("ingestion aborted before completion");
    }
    Ok(())
}

/// Load the config file, falling back to defaults when the default path is
/// simply absent
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::from_file(path).with_context(|| format!("invalid config '{}'", path.display()))
    } else if path == Path::new(DEFAULT_CONFIG_PATH) {
        Ok(Config::default())
    } else {
        bail!("config file not found: {}", path.display());
    }
}

/// Construct the configured sink (Postgres with defaults when no sink
/// section is present)
async fn build_sink(config: &Config) -> Result<Arc<dyn EventSink>> {
    if config.sinks.null.is_some() {
        tracing::warn!("null sink configured - events will be discarded");
        return Ok(Arc::new(NullSink::new()));
    }

    let postgres_config = config
        .sinks
        .postgres
        .as_ref()
        .map(|c| c.to_sink_config())
        .unwrap_or_else(PostgresSinkConfig::default);

    let sink = PostgresSink::connect(postgres_config)
        .await
        .context("failed to connect postgres sink")?;
    Ok(Arc::new(sink))
}
