//! Typed telemetry records shared by the provider, the aggregator and the charts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the aggregator's input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub lap: u32,
    /// Meters from the start of the lap.
    pub distance: f64,
    pub driver: String,
    /// km/h
    pub speed: f64,
    pub x: f64,
    pub y: f64,
}

/// A merged car-data + position sample within a single lap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarSample {
    /// Seconds since the first sample of the lap.
    pub time: f64,
    /// Meters since the first sample of the lap.
    pub distance: f64,
    pub speed: f64,
    pub throttle: f64,
    pub brake: bool,
    pub rpm: f64,
    pub gear: u8,
    pub drs: u8,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LapRecord {
    pub lap_number: u32,
    /// Lap time in seconds; `None` for laps the timing system did not close
    /// (pit in/out, red flag).
    pub lap_time: Option<f64>,
    pub telemetry: Vec<CarSample>,
}

/// Every lap a driver completed in a session, in lap order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriverLaps {
    pub driver: String,
    pub laps: Vec<LapRecord>,
}

impl DriverLaps {
    /// Flattens the laps into the aggregator's input table, preserving
    /// lap order and sample order within each lap.
    pub fn samples(&self) -> Vec<TelemetrySample> {
        self.laps
            .iter()
            .flat_map(|lap| {
                lap.telemetry.iter().map(move |s| TelemetrySample {
                    lap: lap.lap_number,
                    distance: s.distance,
                    driver: self.driver.clone(),
                    speed: s.speed,
                    x: s.x,
                    y: s.y,
                })
            })
            .collect()
    }

    /// The lap with the lowest recorded lap time.
    pub fn fastest(&self) -> Option<&LapRecord> {
        self.laps
            .iter()
            .filter(|l| l.lap_time.is_some_and(f64::is_finite))
            .min_by(|a, b| a.lap_time.partial_cmp(&b.lap_time).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// `(lap_number, lap_time)` pairs for laps with a recorded time.
    pub fn lap_times(&self) -> Vec<(u32, f64)> {
        self.laps
            .iter()
            .filter_map(|l| l.lap_time.map(|t| (l.lap_number, t)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Three-letter code, e.g. `VER`.
    pub acronym: String,
    pub number: u32,
    /// Hex colour without the leading `#`.
    pub team_colour: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    /// Provider-specific session key.
    pub key: String,
    pub year: i32,
    pub event_name: String,
    pub session_name: String,
    pub drivers: Vec<DriverInfo>,
}

impl SessionInfo {
    pub fn driver(&self, acronym: &str) -> Option<&DriverInfo> {
        self.drivers
            .iter()
            .find(|d| d.acronym.eq_ignore_ascii_case(acronym))
    }

    /// `"2023 Bahrain Grand Prix Race"`, used in chart titles.
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.event_name, self.session_name)
    }
}

/// Which session of which event to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionQuery {
    pub season: i32,
    /// Meeting name, country or location (`"Monaco Grand Prix"`, `"Austria"`).
    pub event: String,
    /// Short code (`R`, `Q`, `FP1`, ...) or full session name.
    pub session: String,
}

impl SessionQuery {
    pub fn new(season: i32, event: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            season,
            event: event.into(),
            session: session.into(),
        }
    }

    /// Expands short session codes to the names timing providers use.
    pub fn session_name(&self) -> &str {
        match self.session.trim().to_ascii_uppercase().as_str() {
            "R" => "Race",
            "Q" => "Qualifying",
            "S" => "Sprint",
            "SQ" | "SS" => "Sprint Qualifying",
            "FP1" => "Practice 1",
            "FP2" => "Practice 2",
            "FP3" => "Practice 3",
            _ => self.session.trim(),
        }
    }
}

impl fmt::Display for SessionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.season, self.event, self.session_name())
    }
}

/// Form values carry a display suffix after the code (`"VER Max Verstappen"`).
pub fn driver_code(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(n: u32, time: Option<f64>, speeds: &[f64]) -> LapRecord {
        LapRecord {
            lap_number: n,
            lap_time: time,
            telemetry: speeds
                .iter()
                .enumerate()
                .map(|(i, s)| CarSample {
                    time: i as f64,
                    distance: i as f64 * 10.0,
                    speed: *s,
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_samples_preserve_lap_and_sample_order() {
        let laps = DriverLaps {
            driver: "VER".into(),
            laps: vec![lap(1, Some(90.0), &[100.0, 110.0]), lap(2, Some(89.0), &[120.0])],
        };

        let samples = laps.samples();
        let pairs: Vec<_> = samples.iter().map(|s| (s.lap, s.speed)).collect();
        assert_eq!(pairs, vec![(1, 100.0), (1, 110.0), (2, 120.0)]);
        assert!(samples.iter().all(|s| s.driver == "VER"));
    }

    #[test]
    fn test_fastest_ignores_laps_without_time() {
        let laps = DriverLaps {
            driver: "LEC".into(),
            laps: vec![
                lap(1, None, &[]),
                lap(2, Some(92.5), &[]),
                lap(3, Some(91.1), &[]),
            ],
        };
        assert_eq!(laps.fastest().map(|l| l.lap_number), Some(3));
        assert_eq!(laps.lap_times(), vec![(2, 92.5), (3, 91.1)]);
    }

    #[test]
    fn test_fastest_of_no_timed_laps_is_none() {
        let laps = DriverLaps {
            driver: "LEC".into(),
            laps: vec![lap(1, None, &[])],
        };
        assert!(laps.fastest().is_none());
    }

    #[test]
    fn test_session_code_expansion() {
        assert_eq!(SessionQuery::new(2023, "Monaco", "R").session_name(), "Race");
        assert_eq!(SessionQuery::new(2022, "Austria", "fp1").session_name(), "Practice 1");
        assert_eq!(
            SessionQuery::new(2022, "Austria", "Sprint Shootout").session_name(),
            "Sprint Shootout"
        );
        assert_eq!(
            SessionQuery::new(2023, "Bahrain Grand Prix", "q").to_string(),
            "2023 Bahrain Grand Prix Qualifying"
        );
    }

    #[test]
    fn test_driver_code_strips_display_suffix() {
        assert_eq!(driver_code("VER Max Verstappen"), "VER");
        assert_eq!(driver_code("  HAM"), "HAM");
        assert_eq!(driver_code(""), "");
    }
}
