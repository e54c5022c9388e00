//! Minisector comparison of two drivers.
//!
//! The combined distance range of both drivers' samples is cut into N
//! equal-width minisectors, speed is averaged per driver per minisector, and
//! the faster driver of each minisector is recorded. The result colours a
//! single lap's track map by who was quicker where.

pub mod aggregate;
pub mod partition;
pub mod project;
pub mod select;
pub mod types;
pub mod utility;

use serde::Serialize;
use tracing::debug;

pub use aggregate::aggregate_speeds;
pub use partition::{DEFAULT_MINISECTORS, Partition};
pub use project::project_lap;
pub use select::select_fastest;
pub use types::{
    AggregateScope, DriverPair, FastestSectorAssignment, LapPoint, MinisectorError,
    SectorSpeedRecord,
};

use crate::telemetry::TelemetrySample;

/// Output of one comparison run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FastestSectorMap {
    /// `None` when the input table was empty.
    pub partition: Option<Partition>,
    pub records: Vec<SectorSpeedRecord>,
    pub assignments: Vec<FastestSectorAssignment>,
}

impl FastestSectorMap {
    /// Runs partition, aggregation and selection over `samples`.
    ///
    /// An empty table is not an error: it yields an empty map.
    pub fn compute(
        samples: &[TelemetrySample],
        pair: &DriverPair,
        minisectors: u32,
        scope: AggregateScope,
    ) -> Result<Self, MinisectorError> {
        let Some(partition) = Partition::from_samples(samples, minisectors)? else {
            debug!("No telemetry samples, empty minisector map");
            return Ok(Self::default());
        };

        let records = aggregate_speeds(samples, &partition, scope);
        let assignments = select_fastest(&records, pair);

        debug!(
            samples = samples.len(),
            minisectors,
            assigned = assignments.len(),
            "Minisector comparison complete"
        );

        Ok(Self {
            partition: Some(partition),
            records,
            assignments,
        })
    }

    /// See [`project_lap`]. Empty when the map itself is empty.
    pub fn project(&self, samples: &[TelemetrySample], lap: u32) -> Vec<LapPoint> {
        match &self.partition {
            Some(p) => project_lap(samples, p, &self.assignments, lap),
            None => Vec::new(),
        }
    }

    pub fn winner(&self, minisector: u32) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.minisector == minisector)
            .map(|a| a.fastest_driver.as_str())
    }
}
