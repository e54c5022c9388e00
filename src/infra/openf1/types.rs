//! Wire types for the OpenF1 REST API. Only the fields read here are modelled.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Meeting {
    pub meeting_key: u32,
    pub meeting_name: String,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Meeting {
    /// Exact (case-insensitive) match on name, country or location.
    pub fn matches(&self, event: &str) -> bool {
        let event = event.trim();
        self.meeting_name.eq_ignore_ascii_case(event)
            || self
                .country_name
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(event))
            || self
                .location
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(event))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub session_key: u32,
    pub session_name: String,
    pub year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Driver {
    pub driver_number: u32,
    #[serde(default)]
    pub name_acronym: Option<String>,
    #[serde(default)]
    pub team_colour: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lap {
    pub lap_number: u32,
    #[serde(default)]
    pub lap_duration: Option<f64>,
    #[serde(default)]
    pub date_start: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarData {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub throttle: Option<f64>,
    /// 0 or 100.
    #[serde(default)]
    pub brake: Option<f64>,
    #[serde(default)]
    pub rpm: Option<f64>,
    #[serde(default)]
    pub n_gear: Option<u8>,
    #[serde(default)]
    pub drs: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub date: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
}

/// Seconds since the Unix epoch, with microsecond precision.
pub fn seconds(at: &DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}
