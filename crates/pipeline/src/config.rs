//! Pipeline configuration
//!
//! Pool sizes, buffer capacity, and the filter/batch knobs. All values are
//! fixed for the duration of a run; the coordinator validates them before
//! launching any worker.

use std::time::Duration;

use crate::error::PipelineError;

// =============================================================================
// Constants
// =============================================================================

/// Default reader workers
pub const DEFAULT_PRODUCERS: usize = 4;

/// Default consumer workers (and end markers enqueued at drain)
pub const DEFAULT_CONSUMERS: usize = 4;

/// Default buffer capacity in records
pub const DEFAULT_BUFFER_CAPACITY: usize = 20_000;

/// Default records per sink commit
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Default retention threshold in GeV (strictly greater-than)
pub const DEFAULT_ENERGY_THRESHOLD: f64 = 50.0;

/// Default bounded-offer wait before a reader falls back to a blocking put
pub const DEFAULT_OFFER_TIMEOUT: Duration = Duration::from_secs(1);

/// Default bounded-take wait before a consumer re-checks the drain signal
pub const DEFAULT_TAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default wait between signalling abort and forcing termination
pub const DEFAULT_ABORT_GRACE: Duration = Duration::from_secs(10);

// =============================================================================
// Configuration
// =============================================================================

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of reader workers; inputs are distributed across them
    pub producers: usize,

    /// Number of consumer workers
    pub consumers: usize,

    /// Maximum records held in the buffer
    pub buffer_capacity: usize,

    /// Records per sink commit
    pub batch_size: usize,

    /// Retention predicate bound: keep records with `energy > threshold`
    pub energy_threshold: f64,

    /// Bounded-offer wait for readers
    pub offer_timeout: Duration,

    /// Bounded-take wait for consumers
    pub take_timeout: Duration,

    /// Grace period between abort signal and forced termination
    pub abort_grace: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producers: DEFAULT_PRODUCERS,
            consumers: DEFAULT_CONSUMERS,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            offer_timeout: DEFAULT_OFFER_TIMEOUT,
            take_timeout: DEFAULT_TAKE_TIMEOUT,
            abort_grace: DEFAULT_ABORT_GRACE,
        }
    }
}

impl PipelineConfig {
    /// Validate before the coordinator launches workers
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.producers == 0 {
            return Err(PipelineError::invalid_config(
                "producers",
                "must be positive",
            ));
        }
        if self.consumers == 0 {
            return Err(PipelineError::invalid_config(
                "consumers",
                "must be positive",
            ));
        }
        if self.buffer_capacity == 0 {
            return Err(PipelineError::invalid_config(
                "buffer_capacity",
                "must be positive",
            ));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::invalid_config(
                "batch_size",
                "must be positive",
            ));
        }
        if !self.energy_threshold.is_finite() {
            return Err(PipelineError::invalid_config(
                "energy_threshold",
                "must be finite",
            ));
        }
        if self.take_timeout.is_zero() {
            return Err(PipelineError::invalid_config(
                "take_timeout",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Set the reader worker count
    pub fn with_producers(mut self, producers: usize) -> Self {
        self.producers = producers;
        self
    }

    /// Set the consumer worker count
    pub fn with_consumers(mut self, consumers: usize) -> Self {
        self.consumers = consumers;
        self
    }

    /// Set the buffer capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the energy threshold
    pub fn with_energy_threshold(mut self, threshold: f64) -> Self {
        self.energy_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.producers, 4);
        assert_eq!(config.consumers, 4);
        assert_eq!(config.buffer_capacity, 20_000);
        assert_eq!(config.batch_size, 1_000);
        assert_eq!(config.energy_threshold, 50.0);
    }

    #[test]
    fn test_zero_pool_sizes_rejected() {
        assert!(PipelineConfig::default().with_producers(0).validate().is_err());
        assert!(PipelineConfig::default().with_consumers(0).validate().is_err());
        assert!(PipelineConfig::default()
            .with_buffer_capacity(0)
            .validate()
            .is_err());
        assert!(PipelineConfig::default()
            .with_batch_size(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        assert!(PipelineConfig::default()
            .with_energy_threshold(f64::NAN)
            .validate()
            .is_err());
        assert!(PipelineConfig::default()
            .with_energy_threshold(f64::INFINITY)
            .validate()
            .is_err());
    }
}
