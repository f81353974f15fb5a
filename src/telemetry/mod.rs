//! # Telemetry Module
//!
//! Decoded sensor readings and the events the serial link emits.
//!
//! This module handles:
//! - Decoding one JSON line into a [`TelemetrySample`]
//! - Tagging undecodable lines as [`TelemetryEvent::DecodeError`]
//! - Handing the next sample to a single waiting reader ([`broker`])

pub mod broker;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One temperature/humidity reading from the sensor
///
/// Both fields are optional on the wire; absent or `null` values decode to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub humidity: Option<f32>,
}

/// Output of the serial link, one per non-blank line
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    Sample(TelemetrySample),
    DecodeError { line: String, error: String },
}

/// Decode a single telemetry line (delimiter already stripped)
///
/// # Errors
///
/// Returns `TelemetryDecode` if the line is not a JSON object with numeric
/// `temperature`/`humidity` fields
///
/// # Examples
///
/// ```
/// use rf_thermostat::telemetry::decode_line;
///
/// let sample = decode_line(br#"{"temperature": 21.5, "humidity": 40}"#)?;
/// assert_eq!(sample.temperature, Some(21.5));
/// assert_eq!(sample.humidity, Some(40.0));
/// # Ok::<(), rf_thermostat::error::ThermostatError>(())
/// ```
pub fn decode_line(line: &[u8]) -> Result<TelemetrySample> {
    Ok(serde_json::from_slice(line)?)
}

/// Turn a framed line into the event the link forwards
///
/// Returns `None` for blank lines (keep-alives, stray `\r`).
pub fn classify_line(line: &[u8]) -> Option<TelemetryEvent> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(match decode_line(trimmed.as_bytes()) {
        Ok(sample) => TelemetryEvent::Sample(sample),
        Err(e) => TelemetryEvent::DecodeError {
            line: trimmed.to_string(),
            error: e.to_string(),
        },
    })
}
