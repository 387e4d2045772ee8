//! Pipeline coordinator
//!
//! Sequences the lifecycle of one ingestion run: construct the buffer and
//! counters, launch the worker pools, drain, and report.
//!
//! # Shutdown protocol
//!
//! 1. Wait for every reader to finish; after this no record can enter the
//!    buffer.
//! 2. Enqueue exactly one end marker per consumer with blocking puts.
//! 3. Signal the drain token for consumers idling on an empty buffer.
//! 4. Wait for every consumer to finish (each flushes its residual batch).
//!
//! On external cancellation the coordinator instead waits a bounded grace
//! period for the pools to settle and then forces termination.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use beamline_sinks::EventSink;

use crate::buffer::{Buffer, Item};
use crate::config::PipelineConfig;
use crate::consumer::FilterBatcher;
use crate::error::PipelineError;
use crate::metrics::{CountersSnapshot, PipelineCounters};
use crate::reader::SourceReader;

/// Terminal report of one ingestion run
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    /// Wall time from start to termination
    pub elapsed: Duration,

    /// Final counter values
    pub counters: CountersSnapshot,

    /// Whether the run terminated through the abort path
    pub aborted: bool,
}

impl IngestReport {
    /// Records produced per second of wall time
    pub fn events_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.counters.produced as f64 / secs
        } else {
            0.0
        }
    }
}

/// The ingestion pipeline
///
/// Owns the configuration and the sink reference; each `run` call owns its
/// buffer, counters, and worker pools, so runs never share state.
pub struct Pipeline {
    config: PipelineConfig,
    sink: Arc<dyn EventSink>,
}

impl Pipeline {
    /// Create a pipeline, validating the configuration
    ///
    /// No worker is launched until [`Pipeline::run`].
    pub fn new(config: PipelineConfig, sink: Arc<dyn EventSink>) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, sink })
    }

    /// Ingest the given inputs to completion
    ///
    /// Returns once every accepted record has been persisted or accounted
    /// for in the counters. Cancelling `cancel` switches the run onto the
    /// abort path: workers are signalled, given `abort_grace`, then forced.
    pub async fn run(
        &self,
        inputs: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<IngestReport, PipelineError> {
        let started = Instant::now();
        let counters = Arc::new(PipelineCounters::new());
        let buffer = Buffer::new(self.config.buffer_capacity);
        let drain = CancellationToken::new();

        tracing::info!(
            producers = self.config.producers,
            consumers = self.config.consumers,
            buffer_capacity = self.config.buffer_capacity,
            batch_size = self.config.batch_size,
            threshold_gev = self.config.energy_threshold,
            inputs = inputs.len(),
            "pipeline starting"
        );

        // Consumers first so the buffer is being drained before readers
        // start filling it.
        let mut consumers = JoinSet::new();
        for id in 0..self.config.consumers {
            consumers.spawn(
                FilterBatcher::new(
                    id,
                    buffer.clone(),
                    Arc::clone(&self.sink),
                    Arc::clone(&counters),
                    self.config.energy_threshold,
                    self.config.batch_size,
                    self.config.take_timeout,
                    drain.clone(),
                    cancel.clone(),
                )
                .run(),
            );
        }

        // Distribute inputs round-robin across the reader pool; per-input
        // line order is preserved because each input belongs to one reader.
        let mut assignments: Vec<Vec<PathBuf>> = vec![Vec::new(); self.config.producers];
        for (i, path) in inputs.into_iter().enumerate() {
            assignments[i % self.config.producers].push(path);
        }

        let mut readers = JoinSet::new();
        for (id, paths) in assignments.into_iter().enumerate() {
            if paths.is_empty() {
                continue;
            }
            let reader = SourceReader::new(
                id,
                paths,
                buffer.clone(),
                Arc::clone(&counters),
                self.config.offer_timeout,
                cancel.clone(),
            );
            readers.spawn(async move {
                if let Err(e) = reader.run().await {
                    // Fatal for this reader only; peers keep going.
                    tracing::error!(reader = id, error = %e, "reader failed");
                }
            });
        }

        let drain_result = tokio::select! {
            res = Self::drive_drain(
                &mut readers,
                &mut consumers,
                &buffer,
                &drain,
                self.config.consumers,
            ) => Some(res),
            _ = cancel.cancelled() => None,
        };

        let aborted = match drain_result {
            Some(res) => {
                res?;
                false
            }
            None => {
                self.abort(&mut readers, &mut consumers, &drain).await;
                true
            }
        };

        let elapsed = started.elapsed();
        let report = IngestReport {
            elapsed,
            counters: counters.snapshot(),
            aborted,
        };

        tracing::info!(
            elapsed_ms = elapsed.as_millis() as u64,
            produced = report.counters.produced,
            consumed = report.counters.consumed,
            retained = report.counters.retained,
            rejected_parse = report.counters.rejected_parse,
            rejected_insert = report.counters.rejected_insert,
            offers_refused = report.counters.offers_refused,
            events_per_sec = report.events_per_sec() as u64,
            aborted,
            "pipeline terminated"
        );

        Ok(report)
    }

    /// Normal-completion shutdown sequence
    async fn drive_drain(
        readers: &mut JoinSet<()>,
        consumers: &mut JoinSet<()>,
        buffer: &Buffer,
        drain: &CancellationToken,
        consumer_count: usize,
    ) -> Result<(), PipelineError> {
        // 1. All readers join; no record can be put after this point.
        while let Some(res) = readers.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "reader task failed to join");
            }
        }
        tracing::info!("all readers completed, enqueueing end markers");

        // 2. One end marker per consumer, after every record.
        for _ in 0..consumer_count {
            buffer
                .put(Item::End)
                .await
                .map_err(|_| PipelineError::BufferClosed)?;
        }

        // 3. Wake consumers idling on an empty buffer.
        drain.cancel();

        // 4. Every consumer flushes its residual batch and exits.
        while let Some(res) = consumers.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "consumer task failed to join");
            }
        }

        Ok(())
    }

    /// Abort path: bounded grace, then forced termination
    async fn abort(
        &self,
        readers: &mut JoinSet<()>,
        consumers: &mut JoinSet<()>,
        drain: &CancellationToken,
    ) {
        tracing::warn!(
            grace_ms = self.config.abort_grace.as_millis() as u64,
            "abort requested, waiting for workers to settle"
        );
        drain.cancel();

        let settle = async {
            while readers.join_next().await.is_some() {}
            while consumers.join_next().await.is_some() {}
        };

        if timeout(self.config.abort_grace, settle).await.is_err() {
            tracing::warn!("grace period elapsed, forcing worker termination");
            readers.abort_all();
            consumers.abort_all();
            while readers.join_next().await.is_some() {}
            while consumers.join_next().await.is_some() {}
        }

        tracing::info!("abort completed");
    }
}
