//! CLI entry point for laptrace.
//!
//! Provides subcommands for serving the comparison API, computing a
//! minisector comparison from the terminal, and listing a driver's lap times.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use laptrace::{
    config::ServiceConfig,
    infra::{cache::ResponseCache, openf1::OpenF1Client},
    minisector::{AggregateScope, DriverPair, FastestSectorMap},
    output::{append_records, print_json, print_pretty, sector_rows},
    server::{self, AppState},
    services::TelemetryApi,
    telemetry::{CsvTelemetrySource, SessionQuery, driver_code, validate_samples},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "laptrace")]
#[command(about = "Compare two drivers' telemetry lap by lap and minisector by minisector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where telemetry comes from.
#[derive(Args)]
struct SourceArgs {
    /// JSON config file; command-line values override it
    #[arg(short, long, env = "LAPTRACE_CONFIG")]
    config: Option<PathBuf>,

    /// Read telemetry from a CSV export instead of OpenF1
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// OpenF1 base URL
    #[arg(long, env = "OPENF1_BASE_URL")]
    base_url: Option<String>,

    /// Bearer token for OpenF1
    #[arg(long, env = "OPENF1_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory for cached OpenF1 responses
    #[arg(long, env = "LAPTRACE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Disable the response cache
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

#[derive(Args)]
struct SessionArgs {
    /// Season year
    #[arg(short, long)]
    season: i32,

    /// Event name, country or circuit location
    #[arg(short, long)]
    track: String,

    /// Session code: R, Q, S, SQ, FP1, FP2, FP3
    #[arg(long, default_value = "R")]
    session: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Address to listen on
        #[arg(short, long, env = "LAPTRACE_BIND")]
        bind: Option<String>,
    },
    /// Compute the fastest driver per minisector
    Sectors {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        session: SessionArgs,

        /// First driver; wins ties
        driver1: String,

        /// Second driver
        driver2: String,

        /// Lap aggregated when --single-lap is set
        #[arg(short, long, default_value_t = 1)]
        lap: u32,

        /// Number of minisectors
        #[arg(short, long)]
        minisectors: Option<u32>,

        /// Aggregate only --lap instead of every lap
        #[arg(long, default_value_t = false)]
        single_lap: bool,

        /// CSV file to append winners to
        #[arg(short, long)]
        output: Option<String>,

        /// Log the full result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List a driver's lap times
    Laps {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        session: SessionArgs,

        driver: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/laptrace.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("laptrace.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { source, bind } => {
            let mut config = load_config(&source)?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            let api = build_api(&source, &config)?;

            server::serve(AppState {
                api,
                config: Arc::new(config),
            })
            .await?;
        }
        Commands::Sectors {
            source,
            session,
            driver1,
            driver2,
            lap,
            minisectors,
            single_lap,
            output,
            json,
        } => {
            let config = load_config(&source)?;
            let api = build_api(&source, &config)?;
            let query = SessionQuery::new(session.season, &session.track, &session.session);
            let scope = aggregate_scope(single_lap, lap);

            let map = sectors(
                api.as_ref(),
                &query,
                [driver1.as_str(), driver2.as_str()],
                minisectors.unwrap_or(config.minisectors),
                scope,
            )
            .await?;

            print_pretty(&map);
            if json {
                print_json(&map)?;
            }
            for a in &map.assignments {
                info!(minisector = a.minisector, fastest = %a.fastest_driver, "Minisector");
            }

            if let Some(path) = output {
                let rows = sector_rows(&query.to_string(), &map);
                append_records(&path, &rows)?;
                info!(path = %path, rows = rows.len(), "Results appended");
            }
        }
        Commands::Laps {
            source,
            session,
            driver,
        } => {
            let config = load_config(&source)?;
            let api = build_api(&source, &config)?;
            let query = SessionQuery::new(session.season, &session.track, &session.session);

            let session_info = api.session(&query).await?;
            let code = driver_code(&driver).to_ascii_uppercase();
            let laps = api.driver_laps(&session_info, &code).await?;

            for lap in &laps.laps {
                match lap.lap_time {
                    Some(t) => info!(lap = lap.lap_number, seconds = t, "Lap"),
                    None => info!(lap = lap.lap_number, "Lap without time"),
                }
            }
            info!(
                driver = %laps.driver,
                laps = laps.laps.len(),
                fastest = ?laps.fastest().map(|l| l.lap_number),
                "Lap times listed"
            );
        }
    }

    Ok(())
}

fn aggregate_scope(single_lap: bool, lap: u32) -> AggregateScope {
    if single_lap {
        AggregateScope::Lap(lap)
    } else {
        AggregateScope::AllLaps
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(source: &SourceArgs) -> Result<ServiceConfig> {
    let mut config = ServiceConfig::load_or_default(source.config.as_deref())?;
    if let Some(url) = &source.base_url {
        config.base_url = url.clone();
    }
    if source.token.is_some() {
        config.api_token = source.token.clone();
    }
    if source.no_cache {
        config.cache_dir = None;
    } else if let Some(dir) = &source.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn build_api(source: &SourceArgs, config: &ServiceConfig) -> Result<Arc<dyn TelemetryApi>> {
    if let Some(path) = &source.csv {
        info!(path = %path.display(), "Using CSV telemetry source");
        return Ok(Arc::new(CsvTelemetrySource::open(path)?));
    }

    let cache = match &config.cache_dir {
        Some(dir) => {
            let cache = ResponseCache::open(dir)?;
            info!(dir = %cache.dir().display(), "Response cache ready");
            Some(cache)
        }
        None => {
            warn!("Response cache disabled, every request hits OpenF1");
            None
        }
    };

    info!(base_url = %config.base_url, cached = cache.is_some(), "Using OpenF1 telemetry source");
    let client = OpenF1Client::new(&config.base_url, config.api_token.as_deref(), cache)?;
    Ok(Arc::new(client))
}

#[tracing::instrument(skip(api, query), fields(query = %query))]
async fn sectors(
    api: &dyn TelemetryApi,
    query: &SessionQuery,
    drivers: [&str; 2],
    minisectors: u32,
    scope: AggregateScope,
) -> Result<FastestSectorMap> {
    let session = api.session(query).await?;
    let first = driver_code(drivers[0]).to_ascii_uppercase();
    let second = driver_code(drivers[1]).to_ascii_uppercase();

    let (a, b) = tokio::try_join!(
        api.driver_laps(&session, &first),
        api.driver_laps(&session, &second)
    )?;

    let mut samples = a.samples();
    samples.extend(b.samples());
    validate_samples(&samples).context("telemetry failed validation")?;

    let map = FastestSectorMap::compute(
        &samples,
        &DriverPair::new(first, second),
        minisectors,
        scope,
    )?;
    info!(
        samples = samples.len(),
        assigned = map.assignments.len(),
        "Minisector comparison done"
    );
    Ok(map)
}
