pub mod analysis;
pub mod charts;
pub mod config;
pub mod fetch;
pub mod infra;
pub mod minisector;
pub mod output;
pub mod server;
pub mod services;
pub mod telemetry;
