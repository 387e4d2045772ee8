//! Null sink
//!
//! Accepts every batch and discards it. Useful for measuring pipeline
//! throughput without a database in the loop.

use async_trait::async_trait;

use beamline_event::CollisionEvent;

use crate::common::{SinkError, SinkMetrics, SinkMetricsSnapshot};
use crate::EventSink;

/// Sink that discards all batches
#[derive(Debug, Default)]
pub struct NullSink {
    metrics: SinkMetrics,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a point-in-time snapshot of write metrics
    pub fn metrics(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl EventSink for NullSink {
    async fn insert_batch(&self, events: &[CollisionEvent]) -> Result<(), SinkError> {
        self.metrics.record_batch_written(events.len() as u64);
        tracing::trace!(rows = events.len(), "discarded batch");
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let snapshot = self.metrics.snapshot();
        tracing::info!(
            batches_written = snapshot.batches_written,
            rows_written = snapshot.rows_written,
            "null sink closing"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(energy: f64) -> CollisionEvent {
        CollisionEvent::new(
            Uuid::new_v4(),
            Utc::now(),
            energy,
            beamline_event::ParticleKind::Proton,
            false,
        )
    }

    #[tokio::test]
    async fn test_null_sink_counts_rows() {
        let sink = NullSink::new();

        sink.insert_batch(&[event(60.0), event(70.0)]).await.unwrap();
        sink.insert_batch(&[event(80.0)]).await.unwrap();

        let snapshot = sink.metrics();
        assert_eq!(snapshot.batches_written, 2);
        assert_eq!(snapshot.rows_written, 3);
        assert_eq!(snapshot.write_errors, 0);
    }
}
