//! Beamline - Pipeline
//!
//! The concurrent ingestion pipeline: bounded producer/consumer network
//! with backpressure, an energy filter, transactional batch persistence,
//! and an orderly shutdown protocol.
//!
//! # Architecture
//!
//! ```text
//! [Readers]                 [Buffer]                  [Consumers]
//!   file A ──┐                                      ┌──→ filter → batch ──┐
//!   file B ──┼──→ parse ──→ bounded MPMC channel ───┤                     ├──→ EventSink
//!   file C ──┘                                      └──→ filter → batch ──┘
//! ```
//!
//! # Key Design
//!
//! - **In-band termination**: the channel carries `Item::Data` records and
//!   `Item::End` markers; the coordinator enqueues exactly one `End` per
//!   consumer after every reader has joined, so FIFO ordering guarantees no
//!   record is ever observed after an end marker.
//! - **Backpressure, never loss**: readers try a bounded offer first (which
//!   shows up in the counters when refused) and then fall back to an
//!   unconditional blocking put.
//! - **Cooperative cancellation**: a single `CancellationToken` reaches
//!   every worker; all blocking calls sit inside `tokio::select!` arms, and
//!   consumers flush their residual batch on every exit path.
//! - **Run-scoped counters**: `PipelineCounters` is owned by the run and
//!   shared by `Arc`; there is no process-wide state.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use beamline_pipeline::{Pipeline, PipelineConfig};
//! use beamline_sinks::MemorySink;
//! use tokio_util::sync::CancellationToken;
//!
//! let sink = Arc::new(MemorySink::new());
//! let pipeline = Pipeline::new(PipelineConfig::default(), sink)?;
//! let report = pipeline.run(vec!["events.csv".into()], CancellationToken::new()).await?;
//! println!("{} events/sec", report.events_per_sec());
//! ```

mod buffer;
mod config;
mod consumer;
mod coordinator;
mod error;
mod metrics;
mod reader;

#[cfg(test)]
mod consumer_test;

pub use buffer::{Buffer, Item, TakeOutcome};
pub use config::PipelineConfig;
pub use coordinator::{IngestReport, Pipeline};
pub use error::{PipelineError, ReaderError, Result};
pub use metrics::{CountersSnapshot, PipelineCounters};
