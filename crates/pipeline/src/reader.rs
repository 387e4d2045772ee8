//! Source reader (producer worker)
//!
//! Streams each assigned input line by line, parses, and publishes records
//! onto the shared buffer. Malformed lines are counted and skipped; an I/O
//! error on a stream is fatal to this reader only.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use beamline_event::{is_header, parse_line, CollisionEvent};

use crate::buffer::{Buffer, Item};
use crate::error::ReaderError;
use crate::metrics::PipelineCounters;

/// How often a reader logs throughput progress
const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// One reader worker
///
/// Owns its input handles; everything else is borrowed from the run.
pub(crate) struct SourceReader {
    id: usize,
    inputs: Vec<PathBuf>,
    buffer: Buffer,
    counters: Arc<PipelineCounters>,
    offer_timeout: Duration,
    cancel: CancellationToken,
}

impl SourceReader {
    pub(crate) fn new(
        id: usize,
        inputs: Vec<PathBuf>,
        buffer: Buffer,
        counters: Arc<PipelineCounters>,
        offer_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            inputs,
            buffer,
            counters,
            offer_timeout,
            cancel,
        }
    }

    /// Process every assigned input in order
    ///
    /// Returns on the first stream error; records already published stay
    /// published and are accounted for by the counters.
    pub(crate) async fn run(self) -> Result<(), ReaderError> {
        tracing::debug!(reader = self.id, inputs = self.inputs.len(), "reader started");

        for path in &self.inputs {
            if self.cancel.is_cancelled() {
                break;
            }
            self.read_input(path).await?;
        }

        tracing::debug!(reader = self.id, "reader finished");
        Ok(())
    }

    /// Stream one input without materialising it
    async fn read_input(&self, path: &Path) -> Result<(), ReaderError> {
        let file = File::open(path).await.map_err(|e| ReaderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut lines = BufReader::new(file).lines();

        let started = Instant::now();
        let mut last_progress = started;
        let mut line_number: u64 = 0;
        let mut records: u64 = 0;
        let mut seen_content = false;

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(reader = self.id, path = %path.display(), "reader cancelled");
                    return Ok(());
                }
                res = lines.next_line() => res.map_err(|e| ReaderError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })?,
            };
            let Some(line) = next else {
                break;
            };
            line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            if !seen_content {
                seen_content = true;
                if is_header(&line) {
                    tracing::debug!(reader = self.id, path = %path.display(), "skipping header line");
                    continue;
                }
            }

            match parse_line(&line) {
                Ok(event) => {
                    if !self.publish(event).await? {
                        // Cancelled mid-put; the record was not enqueued.
                        return Ok(());
                    }
                    self.counters.record_produced();
                    records += 1;

                    if last_progress.elapsed() >= PROGRESS_INTERVAL {
                        let per_sec = records as f64 / started.elapsed().as_secs_f64();
                        tracing::info!(
                            reader = self.id,
                            path = %path.display(),
                            records,
                            events_per_sec = per_sec as u64,
                            "reader progress"
                        );
                        last_progress = Instant::now();
                    }
                }
                Err(e) => {
                    self.counters.record_parse_rejected();
                    tracing::warn!(
                        reader = self.id,
                        path = %path.display(),
                        line = line_number,
                        error = %e,
                        "failed to parse line"
                    );
                }
            }
        }

        tracing::debug!(
            reader = self.id,
            path = %path.display(),
            records,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished input"
        );
        Ok(())
    }

    /// Publish one record: bounded offer, then unconditional blocking put
    ///
    /// The refused offer makes sustained backpressure visible in the
    /// counters; the blocking put guarantees progress. Returns false when
    /// cancellation interrupted the put before the record was accepted.
    async fn publish(&self, event: CollisionEvent) -> Result<bool, ReaderError> {
        let refused = self
            .buffer
            .offer(Item::Data(event), self.offer_timeout)
            .await
            .map_err(|_| ReaderError::BufferClosed)?;

        let Some(item) = refused else {
            return Ok(true);
        };

        self.counters.record_offer_refused();
        tracing::warn!(
            reader = self.id,
            buffered = self.buffer.len(),
            "buffer full, falling back to blocking put"
        );

        tokio::select! {
            _ = self.cancel.cancelled() => Ok(false),
            res = self.buffer.put(item) => {
                res.map_err(|_| ReaderError::BufferClosed)?;
                Ok(true)
            }
        }
    }
}
