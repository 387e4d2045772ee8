//! Memory sink
//!
//! In-process event store honoring the same duplicate-id contract as the
//! Postgres sink. Pipeline tests use it to observe committed batches and to
//! inject commit failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use beamline_event::CollisionEvent;

use crate::common::SinkError;
use crate::EventSink;

/// In-memory event sink
///
/// Rows are keyed by event id; inserting an existing id is a no-op, exactly
/// like `ON CONFLICT (id) DO NOTHING`. Commit history records the length of
/// every successfully committed batch in commit order.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<HashMap<Uuid, CollisionEvent>>,
    commits: Mutex<Vec<usize>>,
    fail_next: AtomicBool,
    closed: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct rows stored
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Whether a row with the given id exists
    pub fn contains(&self, id: Uuid) -> bool {
        self.rows.lock().unwrap().contains_key(&id)
    }

    /// Lengths of successfully committed batches, in commit order
    pub fn committed_batch_sizes(&self) -> Vec<usize> {
        self.commits.lock().unwrap().clone()
    }

    /// All stored rows, in no particular order
    pub fn rows(&self) -> Vec<CollisionEvent> {
        self.rows.lock().unwrap().values().copied().collect()
    }

    /// Make the next `insert_batch` call fail
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn insert_batch(&self, events: &[CollisionEvent]) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SinkError::Commit("injected failure".into()));
        }
        if events.is_empty() {
            return Ok(());
        }

        {
            let mut rows = self.rows.lock().unwrap();
            for event in events {
                rows.entry(event.id).or_insert(*event);
            }
        }
        self.commits.lock().unwrap().push(events.len());
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
