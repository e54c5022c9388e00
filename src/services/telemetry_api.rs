//! Trait and helpers for interacting with a timing/telemetry provider.

use anyhow::Result;
use thiserror::Error;

use crate::telemetry::{DriverLaps, SessionInfo, SessionQuery};

/// The provider answered, but has nothing matching the request.
///
/// Returned inside the `anyhow::Error` of [`TelemetryApi`] methods so callers
/// can tell a bad selection apart from a provider failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no {season} event matching '{event}'")]
    UnknownEvent { season: i32, event: String },
    #[error("{event} has no '{session}' session")]
    UnknownSession { event: String, session: String },
}

/// Abstraction over a telemetry provider (e.g., OpenF1, a local CSV export).
#[async_trait::async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Resolves a (season, event, session) tuple and lists its drivers.
    async fn session(&self, query: &SessionQuery) -> Result<SessionInfo>;

    /// Returns every lap `driver` completed in `session`, each with merged
    /// car and position telemetry.
    async fn driver_laps(&self, session: &SessionInfo, driver: &str) -> Result<DriverLaps>;
}
