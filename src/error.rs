//! # Error Types
//!
//! Custom error types for RF Thermostat using `thiserror`.

use std::time::Duration;

use thiserror::Error;

/// Main error type for RF Thermostat
#[derive(Debug, Error)]
pub enum ThermostatError {
    /// Serial connection errors (device missing, unreadable, closed)
    #[error("Serial error: {0}")]
    Serial(String),

    /// A telemetry line that is not a valid JSON record
    #[error("Telemetry decode error: {0}")]
    TelemetryDecode(#[from] serde_json::Error),

    /// No telemetry sample arrived before the read deadline
    #[error("Timed out after {0:?} waiting for a telemetry sample")]
    ReadTimeout(Duration),

    /// The pending read was replaced or the broker went away
    #[error("Pending telemetry read was cancelled before a sample arrived")]
    ReadCancelled,

    /// Raw characteristic value outside of its enumeration
    #[error("Invalid value {value} for characteristic {characteristic}")]
    InvalidCharacteristic {
        characteristic: &'static str,
        value: u8,
    },

    /// Emitter or device id outside of the RF addressing range
    #[error("RF address error: {0}")]
    RfAddress(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for RF Thermostat
pub type Result<T> = std::result::Result<T, ThermostatError>;
