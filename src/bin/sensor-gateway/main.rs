mod args;

use std::{process::ExitCode, time::Duration};

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use sensor_gateway::{
    clock::SystemClock,
    config::Config,
    coordinator::Coordinator,
    db::LocalStore,
    sensor::{SensorEmulator, SensorKind},
    telemetry::TelemetrySink,
};
use tokio::{signal, sync::mpsc::unbounded_channel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

/// Uses RUST_LOG for filtering, defaulting to info.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn run() -> Result<()> {
    let env_file = Args::parse().env_file;
    match dotenvy::from_path(&env_file) {
        Ok(()) => debug!(path = %env_file.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to load environment file: {env_file:?}"));
        }
    }

    let args = Args::parse();
    let timezone = args.timezone();

    let config = Config::new(args.connection_string)
        .context("invalid configuration")?
        .with_database_path(args.database)
        .with_timezone(timezone)
        .with_intervals(
            Duration::from_secs(args.sample_interval_secs),
            Duration::from_secs(args.sensor_interval_secs),
        )
        .context("invalid configuration")?;

    let store = LocalStore::open(&config.database_path)
        .await
        .with_context(|| format!("failed to open local store: {:?}", config.database_path))?;

    let sink = TelemetrySink::connect(&config.connection_string);

    let cancel_token = CancellationToken::new();

    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for interrupt signal");
            return;
        }
        info!("interrupt received, shutting down");
        shutdown.cancel();
    });

    let (humidity_tx, humidity_rx) = unbounded_channel();
    let (temperature_tx, temperature_rx) = unbounded_channel();

    let mut humidity = SensorEmulator::new(SensorKind::Humidity, &cancel_token)
        .with_interval(config.sensor_interval);
    let mut temperature = SensorEmulator::new(SensorKind::Temperature, &cancel_token)
        .with_interval(config.sensor_interval);
    humidity.start(humidity_tx);
    temperature.start(temperature_tx);
    info!("sensor emulators started");

    Coordinator::new(humidity_rx, temperature_rx, store, sink)
        .with_clock(SystemClock::new(config.timezone))
        .with_interval(config.sample_interval)
        .run(cancel_token, &mut [humidity, temperature])
        .await;

    Ok(())
}
