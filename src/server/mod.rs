//! HTTP front-end: form catalog, lap time charts and driver comparisons.
//!
//! | Method | Path             | Body (form-encoded)                                         |
//! |--------|------------------|-------------------------------------------------------------|
//! | GET    | `/`              |                                                             |
//! | POST   | `/get_lap_times` | `season`, `track`, `driver`                                 |
//! | POST   | `/analysis`      | `season`, `track`, `session`, `driver1`, `driver2`, `analysis`, `lap` |
//! | GET    | `/health`        |                                                             |

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;
use crate::services::TelemetryApi;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn TelemetryApi>,
    pub config: Arc<ServiceConfig>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/get_lap_times", post(handlers::get_lap_times))
        .route("/analysis", post(handlers::analysis))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Binds `state.config.bind_addr` and serves until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;
    Ok(())
}
