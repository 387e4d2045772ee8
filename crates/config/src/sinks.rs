//! Sink sections of the configuration file

use std::time::Duration;

use serde::Deserialize;

/// `[sinks]` section
///
/// At most one sink may be configured; when none is, the service falls back
/// to a Postgres sink with default settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SinksConfig {
    /// `[sinks.postgres]`
    pub postgres: Option<PostgresSinkConfig>,

    /// `[sinks.null]`
    pub null: Option<NullSinkConfig>,
}

impl SinksConfig {
    /// Number of configured sink sections
    pub fn enabled_count(&self) -> usize {
        usize::from(self.postgres.is_some()) + usize::from(self.null.is_some())
    }
}

/// `[sinks.postgres]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresSinkConfig {
    /// Connection URL
    pub url: String,

    /// Maximum pooled connections
    pub max_connections: u32,

    /// Connection acquire timeout in milliseconds
    pub acquire_timeout_ms: u64,

    /// Create the events table and indexes on connect
    pub create_schema: bool,
}

impl Default for PostgresSinkConfig {
    fn default() -> Self {
        let defaults = beamline_sinks::PostgresSinkConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
            acquire_timeout_ms: defaults.acquire_timeout.as_millis() as u64,
            create_schema: defaults.create_schema,
        }
    }
}

impl PostgresSinkConfig {
    /// Convert to the runtime sink configuration
    pub fn to_sink_config(&self) -> beamline_sinks::PostgresSinkConfig {
        beamline_sinks::PostgresSinkConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
            create_schema: self.create_schema,
        }
    }
}

/// `[sinks.null]` section
///
/// Discards every batch; only useful for throughput runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NullSinkConfig {}
