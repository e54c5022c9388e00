//! Loads session data through a [`TelemetryApi`] and builds the requested chart.

pub mod delta;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::charts::{Figure, plots, resolve_pair};
use crate::minisector::{AggregateScope, DriverPair, FastestSectorMap, MinisectorError};
use crate::services::{LookupError, TelemetryApi};
use crate::telemetry::{
    DriverLaps, LapRecord, SessionInfo, SessionQuery, TelemetryError, driver_code, validate_samples,
};

pub use delta::delta_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Analysis {
    #[serde(rename = "Lap Time")]
    LapTime,
    #[serde(rename = "Fastest Lap")]
    FastestLap,
    #[serde(rename = "Fastest Sectors")]
    FastestSectors,
    #[serde(rename = "Full Telemetry")]
    FullTelemetry,
}

impl Analysis {
    pub const ALL: [Analysis; 4] = [
        Analysis::LapTime,
        Analysis::FastestLap,
        Analysis::FastestSectors,
        Analysis::FullTelemetry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Analysis::LapTime => "Lap Time",
            Analysis::FastestLap => "Fastest Lap",
            Analysis::FastestSectors => "Fastest Sectors",
            Analysis::FullTelemetry => "Full Telemetry",
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Analysis {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Analysis::ALL
            .into_iter()
            .find(|a| a.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalysisError::UnknownAnalysis(wanted.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown analysis '{0}'")]
    UnknownAnalysis(String),
    #[error("driver {driver} did not take part in {session}")]
    UnknownDriver { driver: String, session: String },
    #[error("no lap data available for {0}")]
    NoData(String),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Minisector(#[from] MinisectorError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("telemetry provider: {0:#}")]
    Provider(anyhow::Error),
}

impl AnalysisError {
    /// Keeps [`LookupError`]s typed; anything else is a provider failure.
    pub fn from_provider(err: anyhow::Error) -> Self {
        match err.downcast::<LookupError>() {
            Ok(lookup) => AnalysisError::Lookup(lookup),
            Err(err) => AnalysisError::Provider(err),
        }
    }
}

/// A two-driver comparison as submitted by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRequest {
    pub query: SessionQuery,
    /// Raw driver labels; only the first whitespace-separated token is the code.
    pub drivers: [String; 2],
    pub analysis: Analysis,
    /// Lap drawn by the fastest-sectors map.
    pub lap: u32,
}

/// Lap time chart for one driver of a race.
#[tracing::instrument(skip(api))]
pub async fn driver_lap_times(
    api: &dyn TelemetryApi,
    season: i32,
    track: &str,
    driver: &str,
) -> Result<Figure, AnalysisError> {
    let query = SessionQuery::new(season, track, "R");
    let session = api.session(&query).await.map_err(AnalysisError::from_provider)?;
    let code = known_driver(&session, driver)?;

    let laps = api
        .driver_laps(&session, &code)
        .await
        .map_err(AnalysisError::from_provider)?;

    info!(laps = laps.laps.len(), "Lap times loaded");
    Ok(plots::driver_lap_times(season, track, &code, &laps))
}

/// Loads both drivers concurrently and builds the chart for `req.analysis`.
#[tracing::instrument(skip(api), fields(analysis = %req.analysis, lap = req.lap))]
pub async fn run_comparison(
    api: &dyn TelemetryApi,
    req: &ComparisonRequest,
    minisectors: u32,
) -> Result<Figure, AnalysisError> {
    let session = api.session(&req.query).await.map_err(AnalysisError::from_provider)?;
    let styles = resolve_pair(&session, [req.drivers[0].as_str(), req.drivers[1].as_str()]);

    let first = known_driver(&session, &styles[0].code)?;
    let second = known_driver(&session, &styles[1].code)?;

    let (a, b) = tokio::try_join!(
        api.driver_laps(&session, &first),
        api.driver_laps(&session, &second)
    )
    .map_err(AnalysisError::from_provider)?;

    debug!(
        first_laps = a.laps.len(),
        second_laps = b.laps.len(),
        "Driver laps loaded"
    );

    let figure = match req.analysis {
        Analysis::LapTime => {
            if a.lap_times().is_empty() && b.lap_times().is_empty() {
                return Err(AnalysisError::NoData(format!("{first} or {second}")));
            }
            plots::lap_time_comparison(&session, &styles, [&a, &b])
        }
        Analysis::FastestLap => {
            let (fa, fb) = fastest_pair(&a, &b)?;
            plots::fastest_lap_comparison(&session, &styles, [fa, fb])
        }
        Analysis::FullTelemetry => {
            let (fa, fb) = fastest_pair(&a, &b)?;
            let delta = delta_time(fa, fb);
            plots::full_telemetry(&session, &styles, [fa, fb], &delta)
        }
        Analysis::FastestSectors => {
            let mut samples = a.samples();
            samples.extend(b.samples());
            validate_samples(&samples)?;

            let pair = DriverPair::new(first, second);
            let map = FastestSectorMap::compute(&samples, &pair, minisectors, AggregateScope::AllLaps)?;
            let points = map.project(&samples, req.lap);

            info!(
                assigned = map.assignments.len(),
                points = points.len(),
                "Fastest sectors computed"
            );
            plots::fastest_sectors_map(&session, &styles, &points, req.lap)
        }
    };

    Ok(figure)
}

fn known_driver(session: &SessionInfo, raw: &str) -> Result<String, AnalysisError> {
    let code = driver_code(raw).to_ascii_uppercase();
    match session.driver(&code) {
        Some(d) => Ok(d.acronym.clone()),
        None => Err(AnalysisError::UnknownDriver {
            driver: code,
            session: session.title(),
        }),
    }
}

fn fastest_pair<'a>(
    a: &'a DriverLaps,
    b: &'a DriverLaps,
) -> Result<(&'a LapRecord, &'a LapRecord), AnalysisError> {
    let fa = a.fastest().ok_or_else(|| AnalysisError::NoData(a.driver.clone()))?;
    let fb = b.fastest().ok_or_else(|| AnalysisError::NoData(b.driver.clone()))?;
    Ok((fa, fb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{CarSample, DriverInfo};
    use anyhow::Result;

    struct FakeApi;

    fn lap(n: u32, time: Option<f64>, speed: f64) -> LapRecord {
        LapRecord {
            lap_number: n,
            lap_time: time,
            telemetry: (0..5)
                .map(|i| CarSample {
                    time: i as f64,
                    distance: i as f64 * 50.0,
                    speed,
                    x: i as f64,
                    y: 0.0,
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[async_trait::async_trait]
    impl TelemetryApi for FakeApi {
        async fn session(&self, query: &SessionQuery) -> Result<SessionInfo> {
            Ok(SessionInfo {
                key: "1".into(),
                year: query.season,
                event_name: query.event.clone(),
                session_name: query.session_name().into(),
                drivers: ["VER", "LEC", "SAR"]
                    .iter()
                    .enumerate()
                    .map(|(i, c)| DriverInfo {
                        acronym: c.to_string(),
                        number: i as u32,
                        team_colour: None,
                    })
                    .collect(),
            })
        }

        async fn driver_laps(&self, _session: &SessionInfo, driver: &str) -> Result<DriverLaps> {
            let laps = match driver {
                "VER" => vec![lap(1, Some(91.0), 250.0), lap(2, Some(90.0), 260.0)],
                "LEC" => vec![lap(1, Some(91.5), 240.0), lap(2, None, 300.0)],
                _ => vec![lap(1, None, 100.0)],
            };
            Ok(DriverLaps {
                driver: driver.into(),
                laps,
            })
        }
    }

    fn request(analysis: Analysis, d2: &str) -> ComparisonRequest {
        ComparisonRequest {
            query: SessionQuery::new(2023, "Bahrain Grand Prix", "R"),
            drivers: ["VER Max Verstappen".into(), d2.into()],
            analysis,
            lap: 1,
        }
    }

    #[test]
    fn test_analysis_parses_labels() {
        assert_eq!("Fastest Sectors".parse::<Analysis>().unwrap(), Analysis::FastestSectors);
        assert_eq!(" lap time ".parse::<Analysis>().unwrap(), Analysis::LapTime);
        assert!(matches!(
            "Pit Stops".parse::<Analysis>(),
            Err(AnalysisError::UnknownAnalysis(_))
        ));
    }

    #[tokio::test]
    async fn test_fastest_sectors_uses_faster_driver() {
        let fig = run_comparison(&FakeApi, &request(Analysis::FastestSectors, "LEC"), 5)
            .await
            .unwrap();

        // Averaged over both laps LEC runs 270 km/h against VER's 255.
        let drawn: Vec<_> = fig.data.iter().filter(|t| !t.x.is_empty()).collect();
        assert!(drawn.iter().all(|t| t.name == "LEC"));
        // Both drivers' lap 1, one path each.
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn.iter().map(|t| t.x.len()).sum::<usize>(), 10);
    }

    #[tokio::test]
    async fn test_fastest_sectors_lap_only_second_driver_reached() {
        // SAR has a single lap; VER has two.
        let mut req = request(Analysis::FastestSectors, "SAR");
        req.drivers = ["SAR".into(), "VER".into()];
        req.lap = 2;

        let fig = run_comparison(&FakeApi, &req, 5).await.unwrap();

        let drawn: usize = fig.data.iter().map(|t| t.x.len()).sum();
        assert_eq!(drawn, 5);
    }

    #[test]
    fn test_lookup_errors_stay_typed() {
        let err = AnalysisError::from_provider(
            LookupError::UnknownEvent {
                season: 2023,
                event: "Atlantis".into(),
            }
            .into(),
        );
        assert!(matches!(err, AnalysisError::Lookup(LookupError::UnknownEvent { .. })));

        let err = AnalysisError::from_provider(anyhow::anyhow!("HTTP 503"));
        assert!(matches!(err, AnalysisError::Provider(_)));
    }

    #[tokio::test]
    async fn test_unknown_driver_rejected() {
        let err = run_comparison(&FakeApi, &request(Analysis::LapTime, "HAM"), 25)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownDriver { ref driver, .. } if driver == "HAM"));
    }

    #[tokio::test]
    async fn test_fastest_lap_without_timed_laps() {
        let err = run_comparison(&FakeApi, &request(Analysis::FastestLap, "SAR"), 25)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoData(ref d) if d == "SAR"));
    }

    #[tokio::test]
    async fn test_full_telemetry_uses_fastest_laps() {
        let fig = run_comparison(&FakeApi, &request(Analysis::FullTelemetry, "LEC"), 25)
            .await
            .unwrap();
        let speed = fig
            .data
            .iter()
            .find(|t| t.yaxis.as_deref() == Some("y2") && t.name.starts_with("VER"))
            .unwrap();
        assert!(speed.y.iter().all(|v| *v == 260.0));
    }

    #[tokio::test]
    async fn test_driver_lap_times_chart() {
        let fig = driver_lap_times(&FakeApi, 2023, "Bahrain Grand Prix", "VER")
            .await
            .unwrap();
        assert_eq!(fig.data[0].y, vec![91.0, 90.0]);
    }
}
