use std::collections::BTreeMap;

use super::types::{DriverPair, FastestSectorAssignment, SectorSpeedRecord};

/// Picks the faster driver of `pair` in every minisector that has a record.
///
/// - both present: strictly greater mean wins, ties go to `pair.first`
/// - one present: that driver wins
/// - neither present: the minisector is left out
///
/// Records for drivers outside `pair` are ignored. Output is ordered by
/// minisector.
pub fn select_fastest(
    records: &[SectorSpeedRecord],
    pair: &DriverPair,
) -> Vec<FastestSectorAssignment> {
    let mut by_sector: BTreeMap<u32, (Option<f64>, Option<f64>)> = BTreeMap::new();

    for r in records.iter().filter(|r| pair.contains(&r.driver)) {
        let slot = by_sector.entry(r.minisector).or_default();
        if r.driver == pair.first {
            slot.0 = Some(r.mean_speed);
        } else {
            slot.1 = Some(r.mean_speed);
        }
    }

    by_sector
        .into_iter()
        .filter_map(|(minisector, speeds)| {
            let winner = match speeds {
                (Some(a), Some(b)) if b > a => &pair.second,
                (Some(_), _) => &pair.first,
                (None, Some(_)) => &pair.second,
                (None, None) => return None,
            };
            Some(FastestSectorAssignment {
                minisector,
                fastest_driver: winner.clone(),
            })
        })
        .collect()
}
