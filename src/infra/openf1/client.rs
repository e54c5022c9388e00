use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{CarData, Driver, Lap, Location, Meeting, Session, seconds};
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::infra::cache::ResponseCache;
use crate::services::{LookupError, TelemetryApi};
use crate::telemetry::assemble::{LapWindow, RawCarPoint, RawPosition, assemble_laps};
use crate::telemetry::{DriverInfo, DriverLaps, SessionInfo, SessionQuery};

pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org";

pub struct OpenF1Client {
    base_url: String,
    http: Box<dyn HttpClient>,
    cache: Option<ResponseCache>,
}

impl OpenF1Client {
    /// Builds a client over HTTP, authenticating with `token` when given.
    pub fn new(base_url: &str, token: Option<&str>, cache: Option<ResponseCache>) -> Result<Self> {
        let basic = BasicClient::new()?;
        let http: Box<dyn HttpClient> = match token {
            Some(t) if !t.is_empty() => Box::new(ApiKey::bearer(basic, t)?),
            _ => Box::new(basic),
        };
        Ok(Self::with_client(base_url, http, cache))
    }

    pub fn with_client(
        base_url: &str,
        http: Box<dyn HttpClient>,
        cache: Option<ResponseCache>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            cache,
        }
    }

    /// GETs a JSON array resource, going through the response cache.
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<T>> {
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        let key = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };

        if let Some(body) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            match serde_json::from_slice(&body) {
                Ok(items) => return Ok(items),
                Err(e) => warn!(key, error = %e, "Cached response no longer parses, refetching"),
            }
        }

        let fetch_start = std::time::Instant::now();
        let body = fetch_bytes(self.http.as_ref(), &url).await?;
        debug!(
            key,
            bytes = body.len(),
            elapsed_ms = fetch_start.elapsed().as_millis() as u64,
            "OpenF1 response received"
        );

        let items: Vec<T> = serde_json::from_slice(&body)
            .with_context(|| format!("failed to parse OpenF1 response for {key}"))?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, &body) {
                warn!(key, error = %e, "Failed to cache response");
            }
        }

        Ok(items)
    }

    async fn meeting(&self, query: &SessionQuery) -> Result<Meeting> {
        let meetings: Vec<Meeting> = self
            .get("/v1/meetings", &[("year", query.season.to_string())])
            .await?;

        let wanted = query.event.trim().to_ascii_lowercase();
        meetings
            .iter()
            .find(|m| m.matches(&query.event))
            .or_else(|| {
                meetings
                    .iter()
                    .find(|m| m.meeting_name.to_ascii_lowercase().contains(&wanted))
            })
            .cloned()
            .ok_or_else(|| {
                LookupError::UnknownEvent {
                    season: query.season,
                    event: query.event.clone(),
                }
                .into()
            })
    }
}

#[async_trait]
impl TelemetryApi for OpenF1Client {
    #[tracing::instrument(skip(self), fields(season = query.season, event = %query.event))]
    async fn session(&self, query: &SessionQuery) -> Result<SessionInfo> {
        let meeting = self.meeting(query).await?;

        let sessions: Vec<Session> = self
            .get("/v1/sessions", &[("meeting_key", meeting.meeting_key.to_string())])
            .await?;
        let wanted = query.session_name();
        let session = sessions
            .into_iter()
            .find(|s| s.session_name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LookupError::UnknownSession {
                event: meeting.meeting_name.clone(),
                session: wanted.to_string(),
            })?;

        let raw_drivers: Vec<Driver> = self
            .get("/v1/drivers", &[("session_key", session.session_key.to_string())])
            .await?;

        let mut drivers: Vec<DriverInfo> = Vec::new();
        for d in raw_drivers {
            let Some(acronym) = d.name_acronym else { continue };
            if drivers.iter().any(|x| x.number == d.driver_number) {
                continue;
            }
            drivers.push(DriverInfo {
                acronym,
                number: d.driver_number,
                team_colour: d.team_colour,
            });
        }

        info!(
            session_key = session.session_key,
            meeting = %meeting.meeting_name,
            session = %session.session_name,
            drivers = drivers.len(),
            "Session resolved"
        );

        Ok(SessionInfo {
            key: session.session_key.to_string(),
            year: session.year,
            event_name: meeting.meeting_name,
            session_name: session.session_name,
            drivers,
        })
    }

    #[tracing::instrument(skip(self, session), fields(session_key = %session.key))]
    async fn driver_laps(&self, session: &SessionInfo, driver: &str) -> Result<DriverLaps> {
        let info = session
            .driver(driver)
            .ok_or_else(|| anyhow!("driver {driver} not in session {}", session.title()))?;

        let params = [
            ("session_key", session.key.clone()),
            ("driver_number", info.number.to_string()),
        ];

        let (laps, car, location) = tokio::try_join!(
            self.get::<Lap>("/v1/laps", &params),
            self.get::<CarData>("/v1/car_data", &params),
            self.get::<Location>("/v1/location", &params),
        )?;

        debug!(
            laps = laps.len(),
            car_samples = car.len(),
            positions = location.len(),
            "Driver data fetched"
        );

        let windows: Vec<LapWindow> = laps
            .iter()
            .map(|l| LapWindow {
                lap_number: l.lap_number,
                start: l.date_start.as_ref().map(seconds),
                duration: l.lap_duration,
            })
            .collect();

        let car: Vec<RawCarPoint> = car
            .iter()
            .filter_map(|c| {
                Some(RawCarPoint {
                    at: seconds(&c.date),
                    speed: c.speed?,
                    throttle: c.throttle.unwrap_or(0.0),
                    brake: c.brake.is_some_and(|b| b > 0.0),
                    rpm: c.rpm.unwrap_or(0.0),
                    gear: c.n_gear.unwrap_or(0),
                    drs: c.drs.unwrap_or(0),
                })
            })
            .collect();

        let positions: Vec<RawPosition> = location
            .iter()
            .map(|p| RawPosition {
                at: seconds(&p.date),
                x: p.x,
                y: p.y,
            })
            .collect();

        Ok(DriverLaps {
            driver: info.acronym.clone(),
            laps: assemble_laps(&windows, &car, &positions),
        })
    }
}
