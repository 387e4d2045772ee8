//! Postgres sink implementation
//!
//! One transaction per batch; duplicate ids are no-ops via
//! `ON CONFLICT (id) DO NOTHING`, which keeps re-ingestion idempotent.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, Postgres};
use sqlx::QueryBuilder;

use beamline_event::CollisionEvent;

use crate::common::{SinkError, SinkMetrics, SinkMetricsSnapshot};
use crate::EventSink;

use super::config::PostgresSinkConfig;

/// Events table name
const TABLE: &str = "collision_events";

/// Rows per INSERT statement, kept well under Postgres' 65535 bind limit
/// (five binds per row).
const MAX_ROWS_PER_STATEMENT: usize = 10_000;

const CREATE_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS collision_events (
    id         UUID PRIMARY KEY,
    timestamp  TIMESTAMPTZ NOT NULL,
    energy_gev DOUBLE PRECISION NOT NULL,
    kind       VARCHAR(16) NOT NULL,
    detected   BOOLEAN NOT NULL
)";

// Descending index serves the high-energy query path
const CREATE_ENERGY_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_collision_events_energy ON collision_events (energy_gev DESC)";

// Descending index serves chronological queries
const CREATE_TIMESTAMP_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_collision_events_timestamp ON collision_events (timestamp DESC)";

/// Postgres-backed event sink
pub struct PostgresSink {
    pool: PgPool,
    metrics: SinkMetrics,
}

impl PostgresSink {
    /// Connect to the database and (optionally) create the schema
    pub async fn connect(config: PostgresSinkConfig) -> Result<Self, SinkError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        let sink = Self {
            pool,
            metrics: SinkMetrics::new(),
        };

        if config.create_schema {
            sink.init_schema().await?;
        }

        tracing::info!(
            table = TABLE,
            max_connections = config.max_connections,
            "postgres sink connected"
        );

        Ok(sink)
    }

    /// Create the events table and its secondary indexes
    async fn init_schema(&self) -> Result<(), SinkError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        sqlx::query(CREATE_ENERGY_INDEX_SQL)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_TIMESTAMP_INDEX_SQL)
            .execute(&self.pool)
            .await?;

        tracing::debug!(table = TABLE, "schema initialized");
        Ok(())
    }

    /// Get a point-in-time snapshot of write metrics
    pub fn metrics(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl EventSink for PostgresSink {
    async fn insert_batch(&self, events: &[CollisionEvent]) -> Result<(), SinkError> {
        if events.is_empty() {
            tracing::debug!("skipping empty batch");
            return Ok(());
        }
        if self.pool.is_closed() {
            return Err(SinkError::Closed);
        }

        let start = Instant::now();

        let result: Result<(), sqlx::Error> = async {
            let mut tx = self.pool.begin().await?;

            for chunk in events.chunks(MAX_ROWS_PER_STATEMENT) {
                let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                    "INSERT INTO collision_events (id, timestamp, energy_gev, kind, detected) ",
                );
                builder.push_values(chunk, |mut row, event| {
                    row.push_bind(event.id)
                        .push_bind(event.timestamp)
                        .push_bind(event.energy_gev)
                        .push_bind(event.kind.as_str())
                        .push_bind(event.detected);
                });
                builder.push(" ON CONFLICT (id) DO NOTHING");

                builder.build().execute(&mut *tx).await?;
            }

            tx.commit().await
        }
        .await;

        match result {
            Ok(()) => {
                self.metrics.record_batch_written(events.len() as u64);
                tracing::debug!(
                    rows = events.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "batch committed"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.record_write_error();
                Err(SinkError::Database(e))
            }
        }
    }

    async fn close(&self) -> Result<(), SinkError> {
        if !self.pool.is_closed() {
            let snapshot = self.metrics.snapshot();
            tracing::info!(
                batches_written = snapshot.batches_written,
                rows_written = snapshot.rows_written,
                write_errors = snapshot.write_errors,
                "postgres sink closing"
            );
            self.pool.close().await;
        }
        Ok(())
    }
}
