use serde::Serialize;

use super::types::MinisectorError;
use crate::telemetry::TelemetrySample;

/// Default number of minisectors a lap is cut into.
pub const DEFAULT_MINISECTORS: u32 = 25;

/// An equal-width grid over the combined distance range of all samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Partition {
    pub min_distance: f64,
    pub max_distance: f64,
    pub count: u32,
}

impl Partition {
    pub fn new(min_distance: f64, max_distance: f64, count: u32) -> Result<Self, MinisectorError> {
        if count == 0 {
            return Err(MinisectorError::ZeroMinisectors);
        }
        Ok(Self {
            min_distance,
            max_distance,
            count,
        })
    }

    /// Grid over every sample regardless of driver, so both drivers share
    /// identical boundaries. `None` when there are no samples.
    pub fn from_samples(
        samples: &[TelemetrySample],
        count: u32,
    ) -> Result<Option<Self>, MinisectorError> {
        if count == 0 {
            return Err(MinisectorError::ZeroMinisectors);
        }

        let mut range: Option<(f64, f64)> = None;
        for s in samples {
            range = Some(match range {
                None => (s.distance, s.distance),
                Some((lo, hi)) => (lo.min(s.distance), hi.max(s.distance)),
            });
        }

        Ok(range.map(|(min_distance, max_distance)| Self {
            min_distance,
            max_distance,
            count,
        }))
    }

    pub fn width(&self) -> f64 {
        (self.max_distance - self.min_distance) / self.count as f64
    }

    /// 1-based bucket for `distance`; values at or past the maximum land in
    /// the last bucket, values below the minimum in the first.
    pub fn minisector(&self, distance: f64) -> u32 {
        let width = self.width();
        if width <= 0.0 || !width.is_finite() {
            return 1;
        }

        let raw = ((distance - self.min_distance) / width).floor();
        if raw.is_nan() || raw < 0.0 {
            1
        } else {
            (raw as u64 + 1).min(self.count as u64) as u32
        }
    }
}
