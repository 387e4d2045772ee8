//! Configuration validation
//!
//! Rejects configurations before any worker or connection is created, with
//! diagnostics naming the offending section and field.

use crate::error::{ConfigError, Result};
use crate::Config;

/// Validate a parsed configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let pipeline = &config.pipeline;

    if pipeline.producers == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "producers",
            "must be positive",
        ));
    }
    if pipeline.consumers == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "consumers",
            "must be positive",
        ));
    }
    if pipeline.buffer_capacity == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "buffer_capacity",
            "must be positive",
        ));
    }
    if pipeline.batch_size == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "batch_size",
            "must be positive",
        ));
    }
    if !pipeline.energy_threshold.is_finite() {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "energy_threshold",
            "must be finite",
        ));
    }
    if pipeline.take_timeout_ms == 0 {
        return Err(ConfigError::invalid_value(
            "pipeline",
            "take_timeout_ms",
            "must be positive",
        ));
    }

    if config.sinks.enabled_count() > 1 {
        return Err(ConfigError::ConflictingSinks);
    }

    if let Some(postgres) = &config.sinks.postgres {
        if postgres.url.is_empty() {
            return Err(ConfigError::invalid_value(
                "sinks.postgres",
                "url",
                "must not be empty",
            ));
        }
        if postgres.max_connections == 0 {
            return Err(ConfigError::invalid_value(
                "sinks.postgres",
                "max_connections",
                "must be positive",
            ));
        }
    }

    Ok(())
}
