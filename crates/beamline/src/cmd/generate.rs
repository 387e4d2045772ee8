//! `generate` subcommand
//!
//! Writes a synthetic CSV file with realistic collision events. The energy
//! range 0.1-125.1 GeV puts roughly 40% of the records above the default
//! 50 GeV threshold, which exercises both filter outcomes.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, SecondsFormat, Utc};
use clap::Args;
use rand::Rng;
use uuid::Uuid;

use beamline_event::{ParticleKind, CSV_HEADER};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output CSV path
    #[arg(short, long, default_value = "data/test_events.csv")]
    pub output: PathBuf,

    /// Number of records to generate
    #[arg(short, long, default_value_t = 10_000)]
    pub rows: usize,
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    generate_file(&args.output, args.rows)?;
    tracing::info!(
        path = %args.output.display(),
        rows = args.rows,
        "generated test events"
    );
    Ok(())
}

/// Write `rows` random records, header included
fn generate_file(path: &Path, rows: usize) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create '{}'", parent.display()))?;
        }
    }

    let file =
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    writeln!(writer, "{CSV_HEADER}")?;

    for _ in 0..rows {
        let id = Uuid::new_v4();
        // Random instant within the last 24 hours
        let timestamp = now - Duration::seconds(rng.gen_range(0..86_400));
        let energy = 0.1 + rng.gen::<f64>() * 125.0;
        let kind = ParticleKind::ALL[rng.gen_range(0..ParticleKind::ALL.len())];
        let detected: bool = rng.gen();

        writeln!(
            writer,
            "{},{},{:.2},{},{}",
            id,
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            energy,
            kind,
            detected
        )?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamline_event::{is_header, parse_line};

    #[test]
    fn test_generated_file_parses_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");

        generate_file(&path, 50).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert!(is_header(lines.next().unwrap()));

        let mut parsed = 0;
        for line in lines {
            let event = parse_line(line).unwrap();
            assert!(event.energy_gev >= 0.1);
            assert!(event.energy_gev <= 125.2);
            parsed += 1;
        }
        assert_eq!(parsed, 50);
    }

    #[test]
    fn test_generate_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("events.csv");

        generate_file(&path, 1).unwrap();
        assert!(path.exists());
    }
}
