//! Data types used by the minisector pipeline.

use serde::Serialize;
use thiserror::Error;

/// Mean speed of one driver over one minisector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSpeedRecord {
    pub driver: String,
    pub minisector: u32,
    pub mean_speed: f64,
}

/// Winner of one minisector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastestSectorAssignment {
    pub minisector: u32,
    pub fastest_driver: String,
}

/// One point of the single-lap track map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapPoint {
    pub x: f64,
    pub y: f64,
    /// Driver whose sample this point is.
    pub driver: String,
    pub fastest_driver: String,
}

/// The two drivers being compared. `first` wins ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverPair {
    pub first: String,
    pub second: String,
}

impl DriverPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn contains(&self, driver: &str) -> bool {
        self.first == driver || self.second == driver
    }
}

/// Which laps contribute to the per-minisector means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AggregateScope {
    #[default]
    AllLaps,
    Lap(u32),
}

impl AggregateScope {
    pub fn includes(&self, lap: u32) -> bool {
        match self {
            AggregateScope::AllLaps => true,
            AggregateScope::Lap(n) => *n == lap,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MinisectorError {
    #[error("minisector count must be at least 1")]
    ZeroMinisectors,
}
