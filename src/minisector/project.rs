use std::collections::HashMap;

use super::partition::Partition;
use super::types::{FastestSectorAssignment, LapPoint};
use crate::telemetry::TelemetrySample;

/// Track-map points for one lap, tagged with the winner of their minisector.
///
/// Input order is kept: the renderer joins consecutive points of the same
/// driver into line segments. Samples in an unassigned minisector are dropped, and an unknown
/// lap yields an empty projection.
pub fn project_lap(
    samples: &[TelemetrySample],
    partition: &Partition,
    assignments: &[FastestSectorAssignment],
    lap: u32,
) -> Vec<LapPoint> {
    let winners: HashMap<u32, &str> = assignments
        .iter()
        .map(|a| (a.minisector, a.fastest_driver.as_str()))
        .collect();

    samples
        .iter()
        .filter(|s| s.lap == lap)
        .filter_map(|s| {
            let driver = winners.get(&partition.minisector(s.distance))?;
            Some(LapPoint {
                x: s.x,
                y: s.y,
                driver: s.driver.clone(),
                fastest_driver: driver.to_string(),
            })
        })
        .collect()
}
