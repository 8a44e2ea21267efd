//! Weight readings and the rows persisted for them

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single weight reading reported by the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Raw weight in device units
    pub weight: i32,

    /// Division (scale interval) reported alongside the weight
    pub division: i8,

    /// Stability flag byte; non-zero once the mechanical reading settled
    pub stable: u8,
}

impl Reading {
    pub fn new(weight: i32, division: i8, stable: u8) -> Self {
        Self {
            weight,
            division,
            stable,
        }
    }

    /// Whether the scale reported a settled reading
    pub fn is_stable(&self) -> bool {
        self.stable != 0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reading[weight={}, division={}, {}]",
            self.weight,
            self.division,
            if self.is_stable() { "stable" } else { "unstable" }
        )
    }
}

/// One row handed to a persistence sink per polling cycle
///
/// Cycles that could not reach the scale are recorded as `(0, 0, 0)` with
/// `connected` cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub weight: i32,
    pub division: i8,
    pub stable: u8,
    pub connected: bool,
    pub recorded_at: DateTime<Utc>,
}

impl Record {
    /// Record for a cycle that produced a reading
    pub fn connected(reading: Reading) -> Self {
        Self::connected_at(reading, Utc::now())
    }

    pub fn connected_at(reading: Reading, recorded_at: DateTime<Utc>) -> Self {
        Self {
            weight: reading.weight,
            division: reading.division,
            stable: reading.stable,
            connected: true,
            recorded_at,
        }
    }

    /// Record for a cycle that failed to reach the scale
    pub fn not_connected() -> Self {
        Self::not_connected_at(Utc::now())
    }

    pub fn not_connected_at(recorded_at: DateTime<Utc>) -> Self {
        Self {
            weight: 0,
            division: 0,
            stable: 0,
            connected: false,
            recorded_at,
        }
    }

    /// The reading carried by this record, if the cycle was connected
    pub fn reading(&self) -> Option<Reading> {
        self.connected
            .then(|| Reading::new(self.weight, self.division, self.stable))
    }

    /// Row values in persisted column order: weight, division, stable, connected
    pub fn columns(&self) -> (i32, i8, u8, u8) {
        (self.weight, self.division, self.stable, self.connected as u8)
    }
}
