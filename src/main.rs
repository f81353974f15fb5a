//! # RF Thermostat
//!
//! Drive a 433 MHz heater switch from a serial temperature/humidity sensor.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (path from the first argument)
//!    - Set up logging to stdout and, optionally, daily-rolling files
//!    - Open the RF bridge
//!
//! 2. **Main Loop**
//!    - The telemetry link task reads and decodes sensor lines, reconnecting
//!      on its own whenever the sensor disappears
//!    - The driver task feeds samples to the controller and re-evaluates the
//!      heating decision on every sample and every refresh interval
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C stops both tasks
//!
//! # Examples
//!
//! ```bash
//! cargo run --release -- config/thermostat.toml
//! ```
//!
//! Expected output:
//! ```text
//! INFO rf_thermostat: RF Thermostat v0.1.0 starting...
//! INFO rf_thermostat: RF bridge opened at /dev/ttyUSB0
//! INFO rf_thermostat::serial: Opened telemetry device at /dev/ttyACM0
//! INFO rf_thermostat::driver: Thermostat driver started (refresh every 120s)
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use rf_thermostat::config::{Config, LoggingConfig};
use rf_thermostat::controller::{ControllerSettings, ThermostatController};
use rf_thermostat::driver::ThermostatDriver;
use rf_thermostat::rf::RfCommandChannel;
use rf_thermostat::serial::TelemetryLink;
use rf_thermostat::telemetry::broker::TelemetryBroker;

/// Used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/thermostat.toml";

/// Capacity of the link -> driver event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "rf-thermostat.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config.logging)?;

    info!("RF Thermostat v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Thermostat '{}' using {}", config.thermostat.name, config_path);

    let rf = RfCommandChannel::open(&config.rf)?;
    info!("RF bridge opened at {}", config.rf.port);

    let settings = ControllerSettings::from_config(&config.thermostat, &config.rf)?;
    let refresh_interval = settings.refresh_interval;
    let broker = Arc::new(TelemetryBroker::new());
    let controller = ThermostatController::new(settings, broker.clone(), Arc::new(rf));
    let driver = ThermostatDriver::new(controller, broker);

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let mut link = TelemetryLink::from_config(&config.serial);
    if !link.start() {
        info!(
            "Telemetry device {} not available yet, will keep retrying",
            link.device_path()
        );
    }

    let mut link_task = tokio::spawn(link.run(events_tx));
    let mut driver_task = tokio::spawn(driver.run(events_rx, refresh_interval));

    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = &mut link_task => match result {
            Ok(Ok(())) => info!("Telemetry link stopped"),
            Ok(Err(e)) => error!("Telemetry link failed: {}", e),
            Err(e) => error!("Telemetry link task panicked: {}", e),
        },

        result = &mut driver_task => {
            if let Err(e) = result {
                error!("Driver task panicked: {}", e);
            }
        }

        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    link_task.abort();
    driver_task.abort();

    Ok(())
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` directives take precedence over the configured level. When
/// `logging.directory` is set, logs are also written to a daily-rolling file
/// there and the returned guard must be held until exit.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = logging
        .level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
