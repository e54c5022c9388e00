//! Provider-facing service traits.

pub mod telemetry_api;

pub use telemetry_api::{LookupError, TelemetryApi};
