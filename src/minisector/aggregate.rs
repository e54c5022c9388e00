use std::collections::BTreeMap;

use super::partition::Partition;
use super::types::{AggregateScope, SectorSpeedRecord};
use super::utility::mean;
use crate::telemetry::TelemetrySample;

/// Mean speed per (driver, minisector), ordered by driver then minisector.
///
/// A driver with no samples in a minisector simply has no record for it.
pub fn aggregate_speeds(
    samples: &[TelemetrySample],
    partition: &Partition,
    scope: AggregateScope,
) -> Vec<SectorSpeedRecord> {
    let mut series: BTreeMap<(&str, u32), Vec<f64>> = BTreeMap::new();

    for s in samples.iter().filter(|s| scope.includes(s.lap)) {
        series
            .entry((s.driver.as_str(), partition.minisector(s.distance)))
            .or_default()
            .push(s.speed);
    }

    series
        .into_iter()
        .map(|((driver, minisector), speeds)| SectorSpeedRecord {
            driver: driver.to_string(),
            minisector,
            mean_speed: mean(&speeds),
        })
        .collect()
}
