//! Beamline - collision-event ingestion service
//!
//! # Usage
//!
//! ```bash
//! # Ingest one or more CSV files
//! beamline ingest data/run_001.csv data/run_002.csv
//! beamline ingest --config configs/beamline.toml data/run_001.csv
//!
//! # Generate synthetic test data
//! beamline generate --rows 100000 --output data/test_events.csv
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Beamline - concurrent collision-event ingestion
#[derive(Parser, Debug)]
#[command(name = "beamline")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest CSV files into the configured sink
    Ingest(cmd::ingest::IngestArgs),

    /// Generate a synthetic test CSV file
    Generate(cmd::generate::GenerateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ingest(args) => cmd::ingest::run(args, cli.log_level).await,
        Command::Generate(args) => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"))?;
            cmd::generate::run(args).await
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
