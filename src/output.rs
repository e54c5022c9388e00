//! Output formatting and persistence for minisector comparisons.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::minisector::FastestSectorMap;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One minisector winner, flattened for CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorRow {
    pub timestamp: i64,
    pub session: String,
    pub minisector: u32,
    pub fastest_driver: String,
    /// The winner's mean speed in km/h.
    pub mean_speed: f64,
}

/// Flattens `map` into CSV rows stamped with the current time.
pub fn sector_rows(session: &str, map: &FastestSectorMap) -> Vec<SectorRow> {
    let timestamp = Utc::now().timestamp();
    map.assignments
        .iter()
        .map(|a| SectorRow {
            timestamp,
            session: session.to_string(),
            minisector: a.minisector,
            fastest_driver: a.fastest_driver.clone(),
            mean_speed: map
                .records
                .iter()
                .find(|r| r.minisector == a.minisector && r.driver == a.fastest_driver)
                .map_or(f64::NAN, |r| r.mean_speed),
        })
        .collect()
}

/// Logs the map using Rust's debug pretty-print format.
pub fn print_pretty(map: &FastestSectorMap) {
    debug!("{:#?}", map);
}

/// Logs the map as pretty-printed JSON.
pub fn print_json(map: &FastestSectorMap) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(map)?);
    Ok(())
}

/// Appends rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, rows: &[SectorRow]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minisector::{AggregateScope, DriverPair};
    use crate::telemetry::TelemetrySample;
    use std::fs;

    fn sample_map() -> FastestSectorMap {
        let samples: Vec<TelemetrySample> = [("VER", 0.0, 300.0), ("LEC", 100.0, 280.0), ("LEC", 200.0, 250.0)]
            .iter()
            .map(|(d, dist, speed)| TelemetrySample {
                lap: 1,
                distance: *dist,
                driver: d.to_string(),
                speed: *speed,
                x: 0.0,
                y: 0.0,
            })
            .collect();
        FastestSectorMap::compute(&samples, &DriverPair::new("VER", "LEC"), 2, AggregateScope::AllLaps)
            .unwrap()
    }

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).display().to_string()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&FastestSectorMap::default());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample_map()).unwrap();
    }

    #[test]
    fn test_sector_rows_carry_winner_speed() {
        let rows = sector_rows("2023 Bahrain Grand Prix Race", &sample_map());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fastest_driver, "VER");
        assert_eq!(rows[0].mean_speed, 300.0);
        assert_eq!(rows[1].fastest_driver, "LEC");
        assert_eq!(rows[1].mean_speed, 265.0);
    }

    #[test]
    fn test_append_records_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "create.csv");

        append_records(&path, &sector_rows("s", &sample_map())).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,session,minisector,fastest_driver,mean_speed"));
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "header.csv");
        let rows = sector_rows("s", &sample_map());

        append_records(&path, &rows).unwrap();
        append_records(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 runs of 2 rows
        assert_eq!(content.lines().count(), 5);
    }
}
