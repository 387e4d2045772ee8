//! Configuration error types

use std::io;

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - invalid value
    #[error("{section}.{field}: {message}")]
    InvalidValue {
        /// Config section (e.g. "pipeline")
        section: &'static str,
        /// Field name
        field: &'static str,
        /// Error message
        message: &'static str,
    },

    /// More than one sink section is configured
    #[error("multiple sinks configured - enable exactly one of [sinks.postgres], [sinks.null]")]
    ConflictingSinks,
}

impl ConfigError {
    /// Create an InvalidValue error
    pub fn invalid_value(
        section: &'static str,
        field: &'static str,
        message: &'static str,
    ) -> Self {
        Self::InvalidValue {
            section,
            field,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::invalid_value("pipeline", "consumers", "must be positive");
        assert_eq!(err.to_string(), "pipeline.consumers: must be positive");
    }

    #[test]
    fn test_conflicting_sinks_display() {
        let err = ConfigError::ConflictingSinks;
        assert!(err.to_string().contains("exactly one"));
    }
}
