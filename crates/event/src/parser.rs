//! CSV line parser
//!
//! Turns one line of `event_id,timestamp,energy_gev,particle_type,detected_at_tracker`
//! into a [`CollisionEvent`], or a [`ParseError`] naming the offending field.
//!
//! The parser is a pure function with no shared state, so any number of
//! reader workers can call it concurrently.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::record::{CollisionEvent, ParticleKind};

/// Number of comma-separated fields in a record line
const FIELD_COUNT: usize = 5;

/// Canonical header line; skipped when it is the first non-empty line of a file
pub const CSV_HEADER: &str = "event_id,timestamp,energy_gev,particle_type,detected_at_tracker";

/// Per-field parse diagnostics
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Line is empty or whitespace-only
    #[error("empty line")]
    Empty,

    /// Line does not have exactly five comma-separated fields
    #[error("expected {FIELD_COUNT} fields, got {found}")]
    WrongArity { found: usize },

    /// First field is not a canonical UUID
    #[error("invalid event id '{0}'")]
    InvalidId(String),

    /// Second field is not an ISO-8601 UTC instant
    #[error("invalid timestamp '{0}' (expected ISO-8601, e.g. 2024-01-01T00:00:00Z)")]
    InvalidTimestamp(String),

    /// Third field is not a finite non-negative number
    #[error("invalid energy '{0}' (expected finite non-negative GeV value)")]
    InvalidEnergy(String),

    /// Fourth field is not a known particle kind
    #[error("invalid particle type '{0}' (expected one of: electron, muon, proton)")]
    InvalidKind(String),

    /// Fifth field is not `true` or `false`
    #[error("invalid boolean '{0}' (expected 'true' or 'false')")]
    InvalidBoolean(String),
}

/// Whether a line is the canonical CSV header
pub fn is_header(line: &str) -> bool {
    line.trim() == CSV_HEADER
}

/// Parse one record line
///
/// Whitespace around each field is ignored. Negative energies are rejected
/// here; nothing downstream ever needs to re-validate a record.
pub fn parse_line(line: &str) -> Result<CollisionEvent, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::WrongArity {
            found: fields.len(),
        });
    }

    let id = Uuid::parse_str(fields[0]).map_err(|_| ParseError::InvalidId(fields[0].into()))?;

    let timestamp = parse_timestamp(fields[1])?;
    let energy_gev = parse_energy(fields[2])?;

    let kind: ParticleKind = fields[3]
        .parse()
        .map_err(|_| ParseError::InvalidKind(fields[3].into()))?;

    let detected = parse_bool(fields[4])?;

    Ok(CollisionEvent::new(
        id, timestamp, energy_gev, kind, detected,
    ))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp(value.into()))
}

fn parse_energy(value: &str) -> Result<f64, ParseError> {
    let energy: f64 = value
        .parse()
        .map_err(|_| ParseError::InvalidEnergy(value.into()))?;

    // f64::from_str happily accepts "inf" and "NaN"
    if !energy.is_finite() || energy < 0.0 {
        return Err(ParseError::InvalidEnergy(value.into()));
    }
    Ok(energy)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ParseError::InvalidBoolean(value.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_LINE: &str =
        "00000000-0000-0000-0000-000000000001,2024-01-01T00:00:00Z,51.0,MUON,true";

    #[test]
    fn test_parse_valid_line() {
        let event = parse_line(GOOD_LINE).unwrap();
        assert_eq!(
            event.id,
            Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap()
        );
        assert_eq!(event.energy_gev, 51.0);
        assert_eq!(event.kind, ParticleKind::Muon);
        assert!(event.detected);
        assert_eq!(event.timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_strips_field_whitespace() {
        let line =
            " 00000000-0000-0000-0000-000000000001 , 2024-01-01T00:00:00Z , 51.0 , muon , TRUE ";
        let event = parse_line(line).unwrap();
        assert_eq!(event.energy_gev, 51.0);
        assert!(event.detected);
    }

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(parse_line(""), Err(ParseError::Empty));
        assert_eq!(parse_line("   \t "), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_wrong_arity() {
        assert_eq!(
            parse_line("bogus,not,a,record"),
            Err(ParseError::WrongArity { found: 4 })
        );
        assert_eq!(
            parse_line(&format!("{GOOD_LINE},extra")),
            Err(ParseError::WrongArity { found: 6 })
        );
    }

    #[test]
    fn test_parse_invalid_id() {
        let line = "not-a-uuid,2024-01-01T00:00:00Z,51.0,muon,true";
        assert!(matches!(parse_line(line), Err(ParseError::InvalidId(_))));
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        let line = "00000000-0000-0000-0000-000000000001,yesterday,51.0,muon,true";
        assert!(matches!(
            parse_line(line),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_parse_rejects_negative_energy() {
        let line = "00000000-0000-0000-0000-000000000001,2024-01-01T00:00:00Z,-1.0,muon,true";
        assert!(matches!(
            parse_line(line),
            Err(ParseError::InvalidEnergy(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_finite_energy() {
        for bad in ["inf", "-inf", "NaN"] {
            let line = format!(
                "00000000-0000-0000-0000-000000000001,2024-01-01T00:00:00Z,{bad},muon,true"
            );
            assert!(
                matches!(parse_line(&line), Err(ParseError::InvalidEnergy(_))),
                "should reject energy '{bad}'"
            );
        }
    }

    #[test]
    fn test_parse_invalid_kind() {
        let line = "00000000-0000-0000-0000-000000000001,2024-01-01T00:00:00Z,51.0,photon,true";
        assert!(matches!(parse_line(line), Err(ParseError::InvalidKind(_))));
    }

    #[test]
    fn test_parse_invalid_boolean() {
        for bad in ["1", "yes", "t", ""] {
            let line = format!(
                "00000000-0000-0000-0000-000000000001,2024-01-01T00:00:00Z,51.0,muon,{bad}"
            );
            assert!(
                matches!(parse_line(&line), Err(ParseError::InvalidBoolean(_))),
                "should reject boolean '{bad}'"
            );
        }
    }

    #[test]
    fn test_header_detection() {
        assert!(is_header(CSV_HEADER));
        assert!(is_header(&format!("  {CSV_HEADER}  ")));
        // Header match is case-sensitive
        assert!(!is_header(&CSV_HEADER.to_uppercase()));
        assert!(!is_header(GOOD_LINE));
    }

    #[test]
    fn test_header_line_does_not_parse() {
        // A file without a header whose first line happens to be data must
        // parse; the header itself never does.
        assert!(parse_line(CSV_HEADER).is_err());
        assert!(parse_line(GOOD_LINE).is_ok());
    }
}
