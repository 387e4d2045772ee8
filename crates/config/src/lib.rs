//! Beamline Configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal
//! config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use beamline_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[pipeline]\nconsumers = 2").unwrap();
//! assert_eq!(config.pipeline.consumers, 2);
//! ```
//!
//! # Example Minimal Config
//!
//! ```toml
//! [sinks.postgres]
//! url = "postgres://app@db:5432/collisions"
//! ```
//!
//! # Example Full Config
//!
//! See `configs/example.toml` for all available options.

mod error;
mod logging;
mod pipeline;
mod sinks;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use logging::LogConfig;
pub use pipeline::PipelineConfig;
pub use sinks::{NullSinkConfig, PostgresSinkConfig, SinksConfig};

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline sizing and timeouts
    pub pipeline: PipelineConfig,

    /// Persistence sink (at most one)
    pub sinks: SinksConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.pipeline.producers, 4);
        assert_eq!(config.pipeline.energy_threshold, 50.0);
        assert_eq!(config.sinks.enabled_count(), 0);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_pipeline_section() {
        let config = Config::from_str(
            "[pipeline]\nconsumers = 8\nenergy_threshold = 75.5\n",
        )
        .unwrap();
        assert_eq!(config.pipeline.consumers, 8);
        assert_eq!(config.pipeline.energy_threshold, 75.5);
        // Untouched fields keep their defaults
        assert_eq!(config.pipeline.producers, 4);
        assert_eq!(config.pipeline.batch_size, 1_000);
    }

    #[test]
    fn test_postgres_sink_section() {
        let config = Config::from_str(
            "[sinks.postgres]\nurl = \"postgres://app@db:5432/collisions\"\nmax_connections = 8\n",
        )
        .unwrap();
        let postgres = config.sinks.postgres.unwrap();
        assert_eq!(postgres.url, "postgres://app@db:5432/collisions");
        assert_eq!(postgres.max_connections, 8);
    }

    #[test]
    fn test_zero_consumers_rejected() {
        let err = Config::from_str("[pipeline]\nconsumers = 0\n").unwrap_err();
        assert!(err.to_string().contains("consumers"));
    }

    #[test]
    fn test_zero_take_timeout_rejected() {
        let err = Config::from_str("[pipeline]\ntake_timeout_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("take_timeout_ms"));
    }

    #[test]
    fn test_conflicting_sinks_rejected() {
        let toml = "[sinks.postgres]\n\n[sinks.null]\n";
        let err = Config::from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingSinks));
    }

    #[test]
    fn test_empty_postgres_url_rejected() {
        let err = Config::from_str("[sinks.postgres]\nurl = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(Config::from_str("[pipeline\nconsumers = ").is_err());
    }
}
