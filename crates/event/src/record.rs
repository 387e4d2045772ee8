//! Collision event record
//!
//! The immutable value that flows from readers, through the buffer, into
//! sink batches. All fields are validated before construction (by the
//! parser for file input, by the generator for synthetic input).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Particle classes recognised by the detector
///
/// Closed set; extend by adding a variant and its token below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Electron,
    Muon,
    Proton,
}

impl ParticleKind {
    /// All known kinds, in declaration order
    pub const ALL: [ParticleKind; 3] = [
        ParticleKind::Electron,
        ParticleKind::Muon,
        ParticleKind::Proton,
    ];

    /// Canonical lowercase token (also the value persisted by sinks)
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKind::Electron => "electron",
            ParticleKind::Muon => "muon",
            ParticleKind::Proton => "proton",
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticleKind {
    type Err = UnknownParticleKind;

    /// Case-insensitive match against the closed set
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for kind in Self::ALL {
            if s.eq_ignore_ascii_case(kind.as_str()) {
                return Ok(kind);
            }
        }
        Err(UnknownParticleKind)
    }
}

/// Token did not match any known particle kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownParticleKind;

/// A single collision event
///
/// Field-wise equality; `energy_gev` is finite and non-negative for every
/// value produced by the parser or the generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Unique event identifier; primary key at the sink
    pub id: Uuid,

    /// Detection instant (UTC, millisecond precision or better)
    pub timestamp: DateTime<Utc>,

    /// Collision energy in GeV
    pub energy_gev: f64,

    /// Detected particle class
    pub kind: ParticleKind,

    /// Whether the particle hit the tracker detector
    pub detected: bool,
}

impl CollisionEvent {
    pub fn new(
        id: Uuid,
        timestamp: DateTime<Utc>,
        energy_gev: f64,
        kind: ParticleKind,
        detected: bool,
    ) -> Self {
        Self {
            id,
            timestamp,
            energy_gev,
            kind,
            detected,
        }
    }
}

impl fmt::Display for CollisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.id,
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.energy_gev,
            self.kind,
            self.detected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> CollisionEvent {
        CollisionEvent::new(
            Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            51.0,
            ParticleKind::Muon,
            true,
        )
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in ParticleKind::ALL {
            assert_eq!(kind.as_str().parse::<ParticleKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_case_insensitive() {
        assert_eq!("MUON".parse::<ParticleKind>().unwrap(), ParticleKind::Muon);
        assert_eq!(
            "Electron".parse::<ParticleKind>().unwrap(),
            ParticleKind::Electron
        );
        assert_eq!(
            "pRoToN".parse::<ParticleKind>().unwrap(),
            ParticleKind::Proton
        );
    }

    #[test]
    fn test_kind_unknown() {
        assert!("neutrino".parse::<ParticleKind>().is_err());
        assert!("".parse::<ParticleKind>().is_err());
    }

    #[test]
    fn test_event_equality_is_field_wise() {
        let a = sample();
        let mut b = a;
        assert_eq!(a, b);

        b.energy_gev = 52.0;
        assert_ne!(a, b);
    }

    #[test]
    fn test_event_display_is_csv_shaped() {
        let line = sample().to_string();
        assert_eq!(line.split(',').count(), 5);
        assert!(line.contains("muon"));
        assert!(line.ends_with("true"));
    }
}
