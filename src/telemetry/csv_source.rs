//! Offline telemetry source backed by a CSV export.
//!
//! One row per car sample:
//!
//! ```text
//! driver,lap,time,speed,throttle,brake,rpm,gear,drs,x,y,lap_time
//! VER,1,3601.20,287.0,100,false,11650,7,0,-1203.0,455.0,92.614
//! ```
//!
//! `time` is seconds on the session clock. `lap_time` may be empty; the
//! first non-empty value seen for a lap wins.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::assemble::{LapWindow, RawCarPoint, RawPosition, assemble_laps};
use super::types::{DriverInfo, DriverLaps, SessionInfo, SessionQuery};
use crate::services::TelemetryApi;

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryRow {
    pub driver: String,
    pub lap: u32,
    pub time: f64,
    pub speed: f64,
    #[serde(default)]
    pub throttle: f64,
    #[serde(default)]
    pub brake: bool,
    #[serde(default)]
    pub rpm: f64,
    #[serde(default)]
    pub gear: u8,
    #[serde(default)]
    pub drs: u8,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub lap_time: Option<f64>,
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<TelemetryRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let row: TelemetryRow = result.with_context(|| format!("bad telemetry row {}", line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Groups rows for one driver into laps, with distance integrated per lap.
pub fn driver_laps_from_rows(rows: &[TelemetryRow], driver: &str) -> DriverLaps {
    let mine: Vec<&TelemetryRow> = rows
        .iter()
        .filter(|r| r.driver.eq_ignore_ascii_case(driver))
        .collect();

    let mut windows: BTreeMap<u32, LapWindow> = BTreeMap::new();
    for r in &mine {
        let w = windows.entry(r.lap).or_insert(LapWindow {
            lap_number: r.lap,
            start: None,
            duration: None,
        });
        w.start = Some(w.start.map_or(r.time, |s| s.min(r.time)));
        if w.duration.is_none() {
            w.duration = r.lap_time;
        }
    }

    let car: Vec<RawCarPoint> = mine
        .iter()
        .map(|r| RawCarPoint {
            at: r.time,
            speed: r.speed,
            throttle: r.throttle,
            brake: r.brake,
            rpm: r.rpm,
            gear: r.gear,
            drs: r.drs,
        })
        .collect();
    let positions: Vec<RawPosition> = mine
        .iter()
        .map(|r| RawPosition {
            at: r.time,
            x: r.x,
            y: r.y,
        })
        .collect();

    let windows: Vec<LapWindow> = windows.into_values().collect();

    DriverLaps {
        driver: driver.to_ascii_uppercase(),
        laps: assemble_laps(&windows, &car, &positions),
    }
}

/// A [`TelemetryApi`] over a CSV file loaded once at construction.
pub struct CsvTelemetrySource {
    path: PathBuf,
    rows: Vec<TelemetryRow>,
}

impl CsvTelemetrySource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path)
            .with_context(|| format!("failed to open telemetry CSV {}", path.display()))?;
        let rows = read_rows(file)?;
        debug!(path = %path.display(), rows = rows.len(), "Loaded telemetry CSV");
        Ok(Self { path, rows })
    }

    pub fn from_rows(path: impl Into<PathBuf>, rows: Vec<TelemetryRow>) -> Self {
        Self {
            path: path.into(),
            rows,
        }
    }

    /// Driver codes in order of first appearance.
    pub fn drivers(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for r in &self.rows {
            if !seen.iter().any(|d| d.eq_ignore_ascii_case(&r.driver)) {
                seen.push(r.driver.to_ascii_uppercase());
            }
        }
        seen
    }
}

#[async_trait::async_trait]
impl TelemetryApi for CsvTelemetrySource {
    async fn session(&self, query: &SessionQuery) -> Result<SessionInfo> {
        let drivers = self
            .drivers()
            .into_iter()
            .enumerate()
            .map(|(i, acronym)| DriverInfo {
                acronym,
                number: i as u32 + 1,
                team_colour: None,
            })
            .collect();

        Ok(SessionInfo {
            key: self.path.display().to_string(),
            year: query.season,
            event_name: query.event.clone(),
            session_name: query.session_name().to_string(),
            drivers,
        })
    }

    async fn driver_laps(&self, session: &SessionInfo, driver: &str) -> Result<DriverLaps> {
        if session.driver(driver).is_none() {
            return Err(anyhow!("driver {driver} not present in {}", self.path.display()));
        }
        Ok(driver_laps_from_rows(&self.rows, driver))
    }
}
