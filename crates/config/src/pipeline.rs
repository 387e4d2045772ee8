//! Pipeline section of the configuration file

use std::time::Duration;

use serde::Deserialize;

/// `[pipeline]` section
///
/// Every field has a default, so the section may be omitted entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of reader workers
    pub producers: usize,

    /// Number of consumer workers
    pub consumers: usize,

    /// Maximum records held in the buffer
    pub buffer_capacity: usize,

    /// Records per sink commit
    pub batch_size: usize,

    /// Retention threshold in GeV (keep records strictly above it)
    pub energy_threshold: f64,

    /// Reader bounded-offer wait in milliseconds
    pub offer_timeout_ms: u64,

    /// Consumer bounded-take wait in milliseconds
    pub take_timeout_ms: u64,

    /// Abort grace period in milliseconds
    pub abort_grace_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let defaults = beamline_pipeline::PipelineConfig::default();
        Self {
            producers: defaults.producers,
            consumers: defaults.consumers,
            buffer_capacity: defaults.buffer_capacity,
            batch_size: defaults.batch_size,
            energy_threshold: defaults.energy_threshold,
            offer_timeout_ms: defaults.offer_timeout.as_millis() as u64,
            take_timeout_ms: defaults.take_timeout.as_millis() as u64,
            abort_grace_ms: defaults.abort_grace.as_millis() as u64,
        }
    }
}

impl PipelineConfig {
    /// Convert to the runtime pipeline configuration
    pub fn to_pipeline_config(&self) -> beamline_pipeline::PipelineConfig {
        beamline_pipeline::PipelineConfig {
            producers: self.producers,
            consumers: self.consumers,
            buffer_capacity: self.buffer_capacity,
            batch_size: self.batch_size,
            energy_threshold: self.energy_threshold,
            offer_timeout: Duration::from_millis(self.offer_timeout_ms),
            take_timeout: Duration::from_millis(self.take_timeout_ms),
            abort_grace: Duration::from_millis(self.abort_grace_ms),
        }
    }
}
