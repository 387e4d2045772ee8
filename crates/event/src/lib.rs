//! Beamline - Event
//!
//! The collision-event model and the CSV line parser shared by every stage
//! of the ingestion pipeline.
//!
//! # Design
//!
//! - `CollisionEvent` is an immutable value type; it is cheap to clone and
//!   moves through channels by value.
//! - `parse_line` is a pure function returning a `Result`, so producer
//!   workers can count and skip malformed lines without unwinding.

mod parser;
mod record;

pub use parser::{is_header, parse_line, ParseError, CSV_HEADER};
pub use record::{CollisionEvent, ParticleKind};
