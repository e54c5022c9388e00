//! Validation at the boundary where provider data becomes [`TelemetrySample`]s.

use thiserror::Error;

use super::types::TelemetrySample;

#[derive(Debug, Error, PartialEq)]
pub enum TelemetryError {
    #[error("sample {index}: empty driver identifier")]
    MissingDriver { index: usize },
    #[error("sample {index} ({driver} lap {lap}): {field} is not finite")]
    NonFinite {
        index: usize,
        driver: String,
        lap: u32,
        field: &'static str,
    },
    #[error("sample {index} ({driver} lap {lap}): negative distance {distance}")]
    NegativeDistance {
        index: usize,
        driver: String,
        lap: u32,
        distance: f64,
    },
}

/// Rejects rows the aggregator cannot bucket or average.
pub fn validate_samples(samples: &[TelemetrySample]) -> Result<(), TelemetryError> {
    for (index, s) in samples.iter().enumerate() {
        if s.driver.trim().is_empty() {
            return Err(TelemetryError::MissingDriver { index });
        }

        let non_finite = |field| TelemetryError::NonFinite {
            index,
            driver: s.driver.clone(),
            lap: s.lap,
            field,
        };

        for (field, value) in [
            ("distance", s.distance),
            ("speed", s.speed),
            ("x", s.x),
            ("y", s.y),
        ] {
            if !value.is_finite() {
                return Err(non_finite(field));
            }
        }

        if s.distance < 0.0 {
            return Err(TelemetryError::NegativeDistance {
                index,
                driver: s.driver.clone(),
                lap: s.lap,
                distance: s.distance,
            });
        }
    }

    Ok(())
}
