//! Telemetry records and everything needed to build them from raw provider data.

pub mod assemble;
pub mod csv_source;
pub mod ingest;
pub mod types;

pub use csv_source::CsvTelemetrySource;
pub use ingest::{TelemetryError, validate_samples};
pub use types::{
    CarSample, DriverInfo, DriverLaps, LapRecord, SessionInfo, SessionQuery, TelemetrySample,
    driver_code,
};
