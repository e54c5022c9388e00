use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::analysis::AnalysisError;

/// Error returned by every handler, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let message = err.to_string();
        match err {
            AnalysisError::UnknownAnalysis(_) | AnalysisError::UnknownDriver { .. } => {
                ApiError::BadRequest(message)
            }
            AnalysisError::NoData(_) | AnalysisError::Lookup(_) => ApiError::NotFound(message),
            AnalysisError::Provider(_) => ApiError::Provider(message),
            AnalysisError::Telemetry(_) | AnalysisError::Minisector(_) => {
                ApiError::Internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minisector::MinisectorError;
    use crate::services::LookupError;

    #[test]
    fn test_analysis_errors_map_to_status() {
        let cases = [
            (AnalysisError::UnknownAnalysis("x".into()), StatusCode::BAD_REQUEST),
            (
                AnalysisError::UnknownDriver {
                    driver: "HAM".into(),
                    session: "2023 Bahrain Grand Prix Race".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (AnalysisError::NoData("VER".into()), StatusCode::NOT_FOUND),
            (
                AnalysisError::from_provider(
                    LookupError::UnknownSession {
                        event: "Bahrain Grand Prix".into(),
                        session: "Sprint".into(),
                    }
                    .into(),
                ),
                StatusCode::NOT_FOUND,
            ),
            (
                AnalysisError::Provider(anyhow::anyhow!("HTTP 503")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::Minisector(MinisectorError::ZeroMinisectors),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_response_carries_status() {
        let resp = ApiError::NotFound("no laps".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
