//! Common types shared by all sinks

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Database-level failure (connection, transaction, statement)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Batch could not be committed
    #[error("batch commit failed: {0}")]
    Commit(String),

    /// Sink was closed before the call
    #[error("sink is closed")]
    Closed,
}

/// Write-path metrics shared by sink implementations
///
/// All counters use relaxed ordering; values are eventually consistent and
/// intended for logging and terminal reports, not for synchronization.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Batches committed successfully
    batches_written: AtomicU64,

    /// Rows contained in committed batches (duplicate no-ops included)
    rows_written: AtomicU64,

    /// Batch commits that failed
    write_errors: AtomicU64,
}

impl SinkMetrics {
    pub const fn new() -> Self {
        Self {
            batches_written: AtomicU64::new(0),
            rows_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    /// Record a committed batch of `rows` rows
    #[inline]
    pub fn record_batch_written(&self, rows: u64) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
    }

    /// Record a failed commit
    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> SinkMetricsSnapshot {
        SinkMetricsSnapshot {
            batches_written: self.batches_written.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinkMetricsSnapshot {
    pub batches_written: u64,
    pub rows_written: u64,
    pub write_errors: u64,
}
