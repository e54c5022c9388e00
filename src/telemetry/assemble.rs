//! Turns independently sampled provider streams into per-lap [`CarSample`]s.
//!
//! Car data (speed, pedals, engine) and position (X/Y) arrive as separate
//! timestamped streams. They are sliced into laps by lap start time, merged
//! by nearest timestamp, and given a cumulative distance by integrating speed.

use super::types::{CarSample, LapRecord};

/// One car-data reading. `at` is seconds on any monotonic session clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCarPoint {
    pub at: f64,
    pub speed: f64,
    pub throttle: f64,
    pub brake: bool,
    pub rpm: f64,
    pub gear: u8,
    pub drs: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPosition {
    pub at: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapWindow {
    pub lap_number: u32,
    /// Start of the lap on the same clock as the raw streams.
    pub start: Option<f64>,
    /// Lap time in seconds.
    pub duration: Option<f64>,
}

/// Fills `distance` as the running sum of `speed / 3.6 * dt`, starting at 0.
pub fn add_distance(samples: &mut [CarSample]) {
    let mut total = 0.0;
    let mut prev: Option<f64> = None;

    for s in samples.iter_mut() {
        if let Some(t) = prev {
            let dt = (s.time - t).max(0.0);
            total += s.speed / 3.6 * dt;
        }
        s.distance = total;
        prev = Some(s.time);
    }
}

/// Position closest in time to `at`. `positions` must be sorted by `at`.
pub fn nearest_position(positions: &[RawPosition], at: f64) -> Option<RawPosition> {
    if positions.is_empty() {
        return None;
    }

    let idx = positions.partition_point(|p| p.at < at);
    let after = positions.get(idx);
    let before = idx.checked_sub(1).and_then(|i| positions.get(i));

    match (before, after) {
        (Some(b), Some(a)) => {
            if (at - b.at).abs() <= (a.at - at).abs() {
                Some(*b)
            } else {
                Some(*a)
            }
        }
        (Some(b), None) => Some(*b),
        (None, Some(a)) => Some(*a),
        (None, None) => None,
    }
}

/// Slices `car` into the given laps and merges positions into each sample.
///
/// A sample belongs to the lap with the latest start not after it. The last
/// lap ends at `start + duration` when the duration is known. Laps without a
/// start time get no telemetry but are still returned so lap times survive.
pub fn assemble_laps(
    windows: &[LapWindow],
    car: &[RawCarPoint],
    positions: &[RawPosition],
) -> Vec<LapRecord> {
    let mut car: Vec<&RawCarPoint> = car.iter().filter(|p| p.at.is_finite()).collect();
    car.sort_by(|a, b| a.at.total_cmp(&b.at));

    let mut positions: Vec<RawPosition> =
        positions.iter().copied().filter(|p| p.at.is_finite()).collect();
    positions.sort_by(|a, b| a.at.total_cmp(&b.at));

    let mut windows: Vec<LapWindow> = windows.to_vec();
    windows.sort_by_key(|w| w.lap_number);

    let starts: Vec<(usize, f64)> = windows
        .iter()
        .enumerate()
        .filter_map(|(i, w)| w.start.map(|s| (i, s)))
        .collect();

    let mut records: Vec<LapRecord> = windows
        .iter()
        .map(|w| LapRecord {
            lap_number: w.lap_number,
            lap_time: w.duration,
            telemetry: Vec::new(),
        })
        .collect();

    for (pos, (idx, start)) in starts.iter().enumerate() {
        let end = match starts.get(pos + 1) {
            Some((_, next)) => Some(*next),
            None => windows[*idx].duration.map(|d| start + d),
        };

        let lo = car.partition_point(|p| p.at < *start);
        let hi = match end {
            Some(e) => car.partition_point(|p| p.at < e),
            None => car.len(),
        };
        if lo >= hi {
            continue;
        }

        let mut samples: Vec<CarSample> = car[lo..hi]
            .iter()
            .map(|p| {
                let (x, y) = nearest_position(&positions, p.at)
                    .map(|q| (q.x, q.y))
                    .unwrap_or((0.0, 0.0));
                CarSample {
                    time: p.at - start,
                    distance: 0.0,
                    speed: p.speed,
                    throttle: p.throttle,
                    brake: p.brake,
                    rpm: p.rpm,
                    gear: p.gear,
                    drs: p.drs,
                    x,
                    y,
                }
            })
            .collect();
        add_distance(&mut samples);
        records[*idx].telemetry = samples;
    }

    records
}
