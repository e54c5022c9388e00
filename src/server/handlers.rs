use axum::Form;
use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use super::error::ApiError;
use crate::analysis::{self, Analysis, ComparisonRequest};
use crate::charts::Figure;
use crate::telemetry::SessionQuery;

/// Selection choices for the front-end form.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub seasons: Vec<i32>,
    pub tracks: Vec<String>,
    pub drivers: Vec<String>,
    pub analyses: Vec<&'static str>,
}

/// A Plotly figure serialized to a string, ready for `Plotly.newPlot`.
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub graph_json: String,
}

impl TryFrom<Figure> for GraphResponse {
    type Error = ApiError;

    fn try_from(figure: Figure) -> Result<Self, Self::Error> {
        let graph_json = figure
            .to_graph_json()
            .map_err(|e| ApiError::Internal(format!("failed to serialize chart: {e}")))?;
        Ok(Self { graph_json })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LapTimesForm {
    pub season: String,
    pub track: String,
    pub driver: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisForm {
    pub season: String,
    pub track: String,
    pub session: String,
    pub driver1: String,
    pub driver2: String,
    pub analysis: String,
    pub lap: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    let catalog = &state.config.catalog;
    Json(IndexResponse {
        seasons: catalog.seasons.clone(),
        tracks: catalog.tracks.clone(),
        drivers: catalog.drivers.clone(),
        analyses: Analysis::ALL.iter().map(|a| a.label()).collect(),
    })
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_lap_times(
    State(state): State<AppState>,
    Form(form): Form<LapTimesForm>,
) -> Result<Json<GraphResponse>, ApiError> {
    let season = parse_season(&form.season)?;
    let track = required("track", &form.track)?;
    let driver = required("driver", &form.driver)?;

    info!(season, track, driver, "Lap times requested");
    let figure = analysis::driver_lap_times(state.api.as_ref(), season, track, driver).await?;
    Ok(Json(GraphResponse::try_from(figure)?))
}

pub async fn analysis(
    State(state): State<AppState>,
    Form(form): Form<AnalysisForm>,
) -> Result<Json<GraphResponse>, ApiError> {
    let season = parse_season(&form.season)?;
    let track = required("track", &form.track)?;
    let driver1 = required("driver1", &form.driver1)?;
    let driver2 = required("driver2", &form.driver2)?;
    let kind: Analysis = form.analysis.parse().map_err(ApiError::from)?;
    let lap = parse_lap(form.lap.as_deref())?;
    let session = match form.session.trim() {
        "" => "R",
        s => s,
    };

    let req = ComparisonRequest {
        query: SessionQuery::new(season, track, session),
        drivers: [driver1.to_string(), driver2.to_string()],
        analysis: kind,
        lap,
    };

    info!(season, track, session, driver1, driver2, analysis = %kind, lap, "Comparison requested");
    let figure = analysis::run_comparison(state.api.as_ref(), &req, state.config.minisectors).await?;
    Ok(Json(GraphResponse::try_from(figure)?))
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    match value.trim() {
        "" => Err(ApiError::BadRequest(format!("missing field '{field}'"))),
        v => Ok(v),
    }
}

fn parse_season(raw: &str) -> Result<i32, ApiError> {
    let raw = required("season", raw)?;
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("season '{raw}' is not a year")))
}

/// Missing or blank means lap 1. A lap the session never reached just
/// draws an empty map.
fn parse_lap(raw: Option<&str>) -> Result<u32, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(1),
        Some(v) => v
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("lap '{v}' is not a lap number"))),
    }
}
