//! Run-scoped pipeline counters
//!
//! Atomic counters shared by every worker of one ingestion run. All
//! operations use relaxed ordering; values are eventually consistent and
//! exact only once the run has terminated.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one ingestion run
///
/// Owned by the coordinator and shared with workers via `Arc`. At clean
/// termination `consumed == produced` and
/// `retained == events_committed + rejected_insert`.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    /// Records emitted by readers onto the buffer
    produced: AtomicU64,

    /// Records taken from the buffer by consumers
    consumed: AtomicU64,

    /// Records that survived the energy filter
    retained: AtomicU64,

    /// Lines that failed to parse
    rejected_parse: AtomicU64,

    /// Records in batches whose commit failed
    rejected_insert: AtomicU64,

    /// Bounded offers refused by a full buffer (backpressure visibility)
    offers_refused: AtomicU64,

    /// Batches committed successfully
    batches_committed: AtomicU64,

    /// Records in successfully committed batches
    events_committed: AtomicU64,
}

impl PipelineCounters {
    pub const fn new() -> Self {
        Self {
            produced: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            retained: AtomicU64::new(0),
            rejected_parse: AtomicU64::new(0),
            rejected_insert: AtomicU64::new(0),
            offers_refused: AtomicU64::new(0),
            batches_committed: AtomicU64::new(0),
            events_committed: AtomicU64::new(0),
        }
    }

    /// Record one record placed onto the buffer
    #[inline]
    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one record taken from the buffer
    #[inline]
    pub fn record_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one record surviving the filter
    #[inline]
    pub fn record_retained(&self) {
        self.retained.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one malformed line
    #[inline]
    pub fn record_parse_rejected(&self) {
        self.rejected_parse.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed batch commit of `rows` records
    #[inline]
    pub fn record_insert_rejected(&self, rows: u64) {
        self.rejected_insert.fetch_add(rows, Ordering::Relaxed);
    }

    /// Record a bounded offer refused by a full buffer
    #[inline]
    pub fn record_offer_refused(&self) {
        self.offers_refused.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully committed batch of `rows` records
    #[inline]
    pub fn record_batch_committed(&self, rows: u64) {
        self.batches_committed.fetch_add(1, Ordering::Relaxed);
        self.events_committed.fetch_add(rows, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            retained: self.retained.load(Ordering::Relaxed),
            rejected_parse: self.rejected_parse.load(Ordering::Relaxed),
            rejected_insert: self.rejected_insert.load(Ordering::Relaxed),
            offers_refused: self.offers_refused.load(Ordering::Relaxed),
            batches_committed: self.batches_committed.load(Ordering::Relaxed),
            events_committed: self.events_committed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountersSnapshot {
    pub produced: u64,
    pub consumed: u64,
    pub retained: u64,
    pub rejected_parse: u64,
    pub rejected_insert: u64,
    pub offers_refused: u64,
    pub batches_committed: u64,
    pub events_committed: u64,
}

impl CountersSnapshot {
    /// Share of consumed records that survived the filter (0.0 - 1.0)
    ///
    /// Returns None before anything was consumed.
    pub fn retention_rate(&self) -> Option<f64> {
        if self.consumed == 0 {
            None
        } else {
            Some(self.retained as f64 / self.consumed as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = PipelineCounters::new();
        assert_eq!(counters.snapshot(), CountersSnapshot::default());
    }

    #[test]
    fn test_record_and_snapshot() {
        let counters = PipelineCounters::new();

        counters.record_produced();
        counters.record_produced();
        counters.record_consumed();
        counters.record_retained();
        counters.record_parse_rejected();
        counters.record_insert_rejected(1000);
        counters.record_offer_refused();
        counters.record_batch_committed(37);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.produced, 2);
        assert_eq!(snapshot.consumed, 1);
        assert_eq!(snapshot.retained, 1);
        assert_eq!(snapshot.rejected_parse, 1);
        assert_eq!(snapshot.rejected_insert, 1000);
        assert_eq!(snapshot.offers_refused, 1);
        assert_eq!(snapshot.batches_committed, 1);
        assert_eq!(snapshot.events_committed, 37);
    }

    #[test]
    fn test_retention_rate() {
        let snapshot = CountersSnapshot {
            consumed: 200,
            retained: 90,
            ..Default::default()
        };
        assert_eq!(snapshot.retention_rate(), Some(0.45));
        assert_eq!(CountersSnapshot::default().retention_rate(), None);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let counters = Arc::new(PipelineCounters::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let c = Arc::clone(&counters);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    c.record_produced();
                    c.record_consumed();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.produced, 4000);
        assert_eq!(snapshot.consumed, 4000);
    }
}
