//! # Serial Communication Module
//!
//! Handles the line-oriented serial link to the telemetry sensor.
//!
//! This module handles:
//! - Opening the sensor tty (and keeping it open)
//! - Reopening it on a fixed interval whenever it is not readable
//! - Framing the byte stream into lines
//! - Decoding each line and forwarding it as a [`TelemetryEvent`]
//!
//! Decode failures are logged and forwarded as events; they never affect the
//! connection itself.

pub mod framing;
pub mod port_trait;

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{Result, ThermostatError};
use crate::telemetry::{classify_line, TelemetryEvent};
use framing::LineFramer;
use port_trait::{SerialConnector, TelemetryStream, TokioSerialConnector};

/// Size of a single read from the tty
const READ_CHUNK_SIZE: usize = 256;

/// Telemetry serial link
///
/// Owns the sensor connection and turns its byte stream into telemetry events.
pub struct TelemetryLink<C: SerialConnector> {
    connector: C,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
    stream: Option<TelemetryStream>,
    framer: LineFramer,
    reconnect_interval: Duration,
}

impl<C: SerialConnector> std::fmt::Debug for TelemetryLink<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryLink")
            .field("device_path", &self.device_path)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl TelemetryLink<TokioSerialConnector> {
    /// Create a link to the tty described by `config`
    ///
    /// Nothing is opened until [`TelemetryLink::start`] or [`TelemetryLink::run`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rf_thermostat::config::SerialConfig;
    /// use rf_thermostat::serial::TelemetryLink;
    ///
    /// let mut link = TelemetryLink::from_config(&SerialConfig::default());
    /// if !link.start() {
    ///     println!("sensor not connected yet, supervision will retry");
    /// }
    /// ```
    pub fn from_config(config: &SerialConfig) -> Self {
        Self::new(
            TokioSerialConnector::new(config.baud_rate),
            config,
        )
    }
}

impl<C: SerialConnector> TelemetryLink<C> {
    pub fn new(connector: C, config: &SerialConfig) -> Self {
        Self {
            connector,
            device_path: config.port.clone(),
            stream: None,
            framer: LineFramer::new(&config.line_delimiter, config.max_line_length),
            reconnect_interval: config.reconnect_interval(),
        }
    }

    /// Open the connection if it is not already open
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if the link is open after the call
    pub fn start(&mut self) -> bool {
        if self.stream.is_some() {
            return true;
        }

        match self.open_stream() {
            Ok(stream) => {
                info!("Opened telemetry device at {}", self.device_path);
                self.framer.clear();
                self.stream = Some(stream);
                true
            }
            Err(e) => {
                debug!("Telemetry device unavailable: {}", e);
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Get the device path of the serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Read telemetry until the event receiver is dropped
    ///
    /// Whenever the stream is missing, closed or failing, the link waits for
    /// the next supervision tick and tries to reopen it. Retries are unbounded.
    pub async fn run(mut self, events: mpsc::Sender<TelemetryEvent>) -> Result<()> {
        let mut supervision = interval(self.reconnect_interval);
        supervision.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut buf = [0u8; READ_CHUNK_SIZE];

        loop {
            let Some(stream) = self.stream.as_mut() else {
                tokio::select! {
                    _ = supervision.tick() => {}
                    _ = events.closed() => break,
                }
                self.start();
                continue;
            };

            let read = tokio::select! {
                read = stream.read(&mut buf) => read,
                _ = events.closed() => break,
            };

            match read {
                Ok(0) => {
                    warn!("Telemetry device {} closed the connection", self.device_path);
                    self.disconnect();
                }
                Ok(n) => {
                    for line in self.framer.push(&buf[..n]) {
                        let Some(event) = classify_line(&line) else {
                            continue;
                        };
                        if let TelemetryEvent::DecodeError { line, error } = &event {
                            warn!("Received invalid telemetry line {:?}: {}", line, error);
                        }
                        if events.send(event).await.is_err() {
                            debug!("Telemetry receiver dropped, stopping link");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to read from {}: {}", self.device_path, e);
                    self.disconnect();
                }
            }
        }

        debug!("Telemetry receiver dropped, stopping link");
        Ok(())
    }

    fn open_stream(&self) -> Result<TelemetryStream> {
        self.connector
            .open(&self.device_path)
            .map_err(|e| ThermostatError::Serial(format!("Failed to open {}: {}", self.device_path, e)))
    }

    fn disconnect(&mut self) {
        self.stream = None;
        self.framer.clear();
    }
}
