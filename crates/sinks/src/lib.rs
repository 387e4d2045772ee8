//! Beamline - Sinks
//!
//! Persistence backends for filtered collision events.
//!
//! # Architecture
//!
//! Consumer workers hand each full batch to an [`EventSink`]; the sink
//! commits the whole batch in a single transaction or reports a single
//! error for it.
//!
//! ```text
//! [Consumer] --&[CollisionEvent]--> [EventSink::insert_batch] --> [Destination]
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose | Durable |
//! |------|---------|---------|
//! | `postgres` | Primary event store | Yes |
//! | `null` | Throughput runs (discard all) | No |
//! | `memory` | In-process store for tests | No |
//!
//! # Contract
//!
//! `insert_batch` is transactional per call and idempotent on `id`: a row
//! whose id already exists is a no-op, never an error. Re-ingesting a file
//! therefore yields the same row set as ingesting it once.

use async_trait::async_trait;

use beamline_event::CollisionEvent;

/// Postgres sink - durable event store
pub mod postgres;

/// Null sink - discards all data (for benchmarking)
pub mod null;

/// Memory sink - in-process store used by pipeline tests
pub mod memory;

mod common;

pub use common::{SinkError, SinkMetrics, SinkMetricsSnapshot};
pub use memory::MemorySink;
pub use null::NullSink;
pub use postgres::{PostgresSink, PostgresSinkConfig};

/// Transactional batch-insert interface
///
/// Implementations must be safe for concurrent `insert_batch` calls from
/// multiple consumer workers; each call manages its own transaction scope.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Commit an ordered batch in a single transaction
    ///
    /// Either every row is committed (rows with a duplicate id counting as
    /// committed no-ops) or the call returns an error and no row is.
    async fn insert_batch(&self, events: &[CollisionEvent]) -> Result<(), SinkError>;

    /// Release sink resources
    ///
    /// Idempotent; called once by the owner after the pipeline drains.
    async fn close(&self) -> Result<(), SinkError>;
}
