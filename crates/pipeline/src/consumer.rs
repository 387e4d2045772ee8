//! Filter/batcher (consumer worker)
//!
//! Takes records from the buffer, drops those at or below the energy
//! threshold, accumulates survivors, and commits full batches through the
//! sink. The residual batch is flushed on every exit path.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use beamline_event::CollisionEvent;
use beamline_sinks::EventSink;

use crate::buffer::{Buffer, Item, TakeOutcome};
use crate::metrics::PipelineCounters;

/// One consumer worker
pub(crate) struct FilterBatcher {
    id: usize,
    buffer: Buffer,
    sink: Arc<dyn EventSink>,
    counters: Arc<PipelineCounters>,
    threshold: f64,
    batch_size: usize,
    take_timeout: Duration,
    /// Signalled by the coordinator once all end markers are enqueued
    drain: CancellationToken,
    /// Abort signal shared by every worker
    cancel: CancellationToken,
    batch: Vec<CollisionEvent>,
}

impl FilterBatcher {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: usize,
        buffer: Buffer,
        sink: Arc<dyn EventSink>,
        counters: Arc<PipelineCounters>,
        threshold: f64,
        batch_size: usize,
        take_timeout: Duration,
        drain: CancellationToken,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            buffer,
            sink,
            counters,
            threshold,
            batch_size,
            take_timeout,
            drain,
            cancel,
            batch: Vec::with_capacity(batch_size),
        }
    }

    /// Consume until an end marker, the drain signal, or cancellation
    pub(crate) async fn run(mut self) {
        tracing::debug!(
            consumer = self.id,
            threshold_gev = self.threshold,
            batch_size = self.batch_size,
            "consumer started"
        );

        loop {
            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(consumer = self.id, "consumer cancelled");
                    break;
                }
                outcome = self.buffer.take(self.take_timeout) => outcome,
            };

            match outcome {
                TakeOutcome::Item(Item::Data(event)) => {
                    self.counters.record_consumed();
                    if event.energy_gev > self.threshold {
                        self.counters.record_retained();
                        self.batch.push(event);
                        if self.batch.len() >= self.batch_size {
                            self.flush().await;
                        }
                    }
                }
                TakeOutcome::Item(Item::End) => {
                    tracing::debug!(consumer = self.id, "received end marker");
                    break;
                }
                TakeOutcome::TimedOut => {
                    // Empty buffer; leave once the coordinator has signalled
                    // that no more records are coming.
                    if self.drain.is_cancelled() {
                        tracing::debug!(consumer = self.id, "drain signalled on empty buffer");
                        break;
                    }
                }
                TakeOutcome::Closed => {
                    tracing::debug!(consumer = self.id, "buffer closed");
                    break;
                }
            }
        }

        if !self.batch.is_empty() {
            tracing::debug!(
                consumer = self.id,
                rows = self.batch.len(),
                "flushing residual batch"
            );
            self.flush().await;
        }

        tracing::debug!(consumer = self.id, "consumer finished");
    }

    /// Commit the accumulated batch and clear it
    ///
    /// A failed commit counts every record of the batch as rejected; the
    /// consumer then continues with the next batch. Retry is the caller's
    /// policy, not the pipeline's.
    async fn flush(&mut self) {
        let rows = self.batch.len();
        match self.sink.insert_batch(&self.batch).await {
            Ok(()) => {
                self.counters.record_batch_committed(rows as u64);

                let total: f64 = self.batch.iter().map(|e| e.energy_gev).sum();
                let max = self
                    .batch
                    .iter()
                    .map(|e| e.energy_gev)
                    .fold(f64::NEG_INFINITY, f64::max);
                tracing::debug!(
                    consumer = self.id,
                    rows,
                    mean_energy_gev = total / rows as f64,
                    max_energy_gev = max,
                    "batch committed"
                );
            }
            Err(e) => {
                self.counters.record_insert_rejected(rows as u64);
                tracing::error!(
                    consumer = self.id,
                    rows,
                    error = %e,
                    "batch commit failed"
                );
            }
        }
        self.batch.clear();
    }
}
