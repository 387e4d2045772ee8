//! Consumer worker tests

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use beamline_event::{CollisionEvent, ParticleKind};
use beamline_sinks::{EventSink, MemorySink};

use crate::buffer::{Buffer, Item};
use crate::consumer::FilterBatcher;
use crate::metrics::PipelineCounters;

const TAKE_TIMEOUT: Duration = Duration::from_millis(50);

fn event(energy: f64) -> CollisionEvent {
    CollisionEvent::new(
        Uuid::new_v4(),
        Utc::now(),
        energy,
        ParticleKind::Electron,
        false,
    )
}

struct Harness {
    buffer: Buffer,
    sink: Arc<MemorySink>,
    counters: Arc<PipelineCounters>,
    drain: CancellationToken,
    cancel: CancellationToken,
}

impl Harness {
    fn new() -> Self {
        Self {
            buffer: Buffer::new(64),
            sink: Arc::new(MemorySink::new()),
            counters: Arc::new(PipelineCounters::new()),
            drain: CancellationToken::new(),
            cancel: CancellationToken::new(),
        }
    }

    fn consumer(&self, threshold: f64, batch_size: usize) -> FilterBatcher {
        FilterBatcher::new(
            0,
            self.buffer.clone(),
            Arc::clone(&self.sink) as Arc<dyn EventSink>,
            Arc::clone(&self.counters),
            threshold,
            batch_size,
            TAKE_TIMEOUT,
            self.drain.clone(),
            self.cancel.clone(),
        )
    }
}

#[tokio::test]
async fn test_consumer_flushes_residual_batch_on_end_marker() {
    let harness = Harness::new();
    for _ in 0..3 {
        harness.buffer.put(Item::Data(event(80.0))).await.unwrap();
    }
    harness.buffer.put(Item::End).await.unwrap();

    harness.consumer(50.0, 100).run().await;

    assert_eq!(harness.sink.committed_batch_sizes(), vec![3]);
    let snapshot = harness.counters.snapshot();
    assert_eq!(snapshot.consumed, 3);
    assert_eq!(snapshot.retained, 3);
}

#[tokio::test]
async fn test_consumer_discards_below_threshold_without_error() {
    let harness = Harness::new();
    harness.buffer.put(Item::Data(event(50.0))).await.unwrap(); // boundary: not retained
    harness.buffer.put(Item::Data(event(49.0))).await.unwrap();
    harness.buffer.put(Item::Data(event(50.1))).await.unwrap();
    harness.buffer.put(Item::End).await.unwrap();

    harness.consumer(50.0, 100).run().await;

    let snapshot = harness.counters.snapshot();
    assert_eq!(snapshot.consumed, 3);
    assert_eq!(snapshot.retained, 1);
    assert_eq!(snapshot.rejected_insert, 0);
    assert_eq!(harness.sink.row_count(), 1);
}

#[tokio::test]
async fn test_consumer_flushes_full_batches_as_they_fill() {
    let harness = Harness::new();
    for _ in 0..5 {
        harness.buffer.put(Item::Data(event(99.0))).await.unwrap();
    }
    harness.buffer.put(Item::End).await.unwrap();

    harness.consumer(50.0, 2).run().await;

    assert_eq!(harness.sink.committed_batch_sizes(), vec![2, 2, 1]);
}

#[tokio::test]
async fn test_consumer_exits_on_drain_signal_with_empty_buffer() {
    let harness = Harness::new();
    harness.drain.cancel();

    // No items at all: the first bounded take times out, sees the drain
    // signal, and the consumer exits without committing anything.
    timeout(Duration::from_secs(5), harness.consumer(50.0, 10).run())
        .await
        .expect("consumer did not exit on drain signal");

    assert!(harness.sink.committed_batch_sizes().is_empty());
}

#[tokio::test]
async fn test_consumer_flushes_residual_batch_on_cancellation() {
    let harness = Harness::new();
    for _ in 0..4 {
        harness.buffer.put(Item::Data(event(70.0))).await.unwrap();
    }

    let consumer = harness.consumer(50.0, 100);
    let handle = tokio::spawn(consumer.run());

    // Let the consumer drain the buffer, then cancel mid-run.
    tokio::time::sleep(Duration::from_millis(30)).await;
    harness.cancel.cancel();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("consumer did not exit on cancellation")
        .unwrap();

    // The partial batch was committed exactly once on the way out.
    assert_eq!(harness.sink.committed_batch_sizes(), vec![4]);
}

#[tokio::test]
async fn test_consumer_continues_after_failed_commit() {
    let harness = Harness::new();
    harness.sink.fail_next_commit();
    for _ in 0..4 {
        harness.buffer.put(Item::Data(event(70.0))).await.unwrap();
    }
    harness.buffer.put(Item::End).await.unwrap();

    harness.consumer(50.0, 2).run().await;

    let snapshot = harness.counters.snapshot();
    assert_eq!(snapshot.retained, 4);
    assert_eq!(snapshot.rejected_insert, 2);
    assert_eq!(snapshot.events_committed, 2);
    assert_eq!(harness.sink.committed_batch_sizes(), vec![2]);
}
