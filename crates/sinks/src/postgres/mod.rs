//! Postgres sink
//!
//! Durable event store backed by a `sqlx` connection pool. Batch inserts
//! run in one transaction per call and ignore duplicate primary keys, so
//! re-ingesting a file is a no-op at the row level.

mod config;
mod sink;

pub use config::PostgresSinkConfig;
pub use sink::PostgresSink;
