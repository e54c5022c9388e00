//! OpenF1 (<https://openf1.org>) implementation of [`TelemetryApi`](crate::services::TelemetryApi).

pub mod client;
pub mod types;

pub use client::{DEFAULT_BASE_URL, OpenF1Client};
