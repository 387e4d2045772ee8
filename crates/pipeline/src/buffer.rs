//! Bounded record buffer
//!
//! Multi-producer / multi-consumer FIFO handoff between readers and
//! consumers. Backpressure is the only overflow policy: a full buffer makes
//! producers wait, never drops or resizes.
//!
//! Termination travels in-band: the buffer carries [`Item::End`] markers as
//! ordinary values, so FIFO ordering guarantees every data item enqueued
//! before a marker is dequeued before it.

use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError};
use tokio::time::timeout;

use beamline_event::CollisionEvent;

/// Value carried by the buffer
#[derive(Debug, Clone)]
pub enum Item {
    /// One parsed collision event
    Data(CollisionEvent),

    /// Termination marker; each consumer exits on the first one it takes
    End,
}

/// Outcome of a bounded take
#[derive(Debug)]
pub enum TakeOutcome {
    /// An item was dequeued
    Item(Item),

    /// The wait elapsed with the buffer empty
    TimedOut,

    /// The buffer is closed and drained
    Closed,
}

/// Bounded MPMC buffer
///
/// Cloning is cheap and every clone refers to the same channel; readers and
/// consumers each hold one.
#[derive(Debug, Clone)]
pub struct Buffer {
    tx: Sender<Item>,
    rx: Receiver<Item>,
    capacity: usize,
}

impl Buffer {
    /// Create a buffer holding at most `capacity` items
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; the coordinator validates capacity
    /// before constructing the buffer.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be positive");
        let (tx, rx) = async_channel::bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Enqueue an item, waiting as long as it takes for capacity
    pub async fn put(&self, item: Item) -> Result<(), BufferClosed> {
        self.tx.send(item).await.map_err(|_| BufferClosed)
    }

    /// Enqueue an item with a bounded wait
    ///
    /// Returns `Ok(None)` when the item was accepted and `Ok(Some(item))`
    /// when the buffer stayed full for the whole wait; the caller decides
    /// how to apply backpressure from there.
    pub async fn offer(&self, item: Item, wait: Duration) -> Result<Option<Item>, BufferClosed> {
        match self.tx.try_send(item) {
            Ok(()) => Ok(None),
            Err(TrySendError::Closed(_)) => Err(BufferClosed),
            Err(TrySendError::Full(item)) => {
                // A send future dropped at the deadline has not enqueued its
                // item, so the original can be handed back untouched.
                match timeout(wait, self.tx.send(item.clone())).await {
                    Ok(Ok(())) => Ok(None),
                    Ok(Err(_)) => Err(BufferClosed),
                    Err(_elapsed) => Ok(Some(item)),
                }
            }
        }
    }

    /// Dequeue an item with a bounded wait
    pub async fn take(&self, wait: Duration) -> TakeOutcome {
        match timeout(wait, self.rx.recv()).await {
            Ok(Ok(item)) => TakeOutcome::Item(item),
            Ok(Err(_)) => TakeOutcome::Closed,
            Err(_elapsed) => TakeOutcome::TimedOut,
        }
    }

    /// Current number of buffered items (observational, for metrics only)
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether the buffer is currently empty (observational)
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Fixed capacity chosen at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The buffer's channel closed while a worker was using it
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer closed")]
pub struct BufferClosed;
