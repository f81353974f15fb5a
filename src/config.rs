//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ThermostatError};
use crate::rf::{DeviceId, EmitterId};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub thermostat: ThermostatConfig,
    pub rf: RfConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_line_delimiter")]
    pub line_delimiter: String,

    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

/// Thermostat behaviour configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ThermostatConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_min_temp")]
    pub min_temp: f32,

    #[serde(default = "default_max_temp")]
    pub max_temp: f32,

    #[serde(default = "default_step")]
    pub step: f32,

    #[serde(default = "default_refresh_time_ms")]
    pub refresh_time_ms: u64,

    /// 0 disables the timeout: reads wait for the next sample forever
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// RF transmitter configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RfConfig {
    #[serde(default = "default_rf_port")]
    pub port: String,

    #[serde(default = "default_rf_baud_rate")]
    pub baud_rate: u32,

    pub emitter_id: u32,

    pub device_id: u8,

    #[serde(default = "default_repeat_count")]
    pub repeat_count: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write logs to daily-rolling files in this directory
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            line_delimiter: default_line_delimiter(),
            max_line_length: default_max_line_length(),
        }
    }
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            min_temp: default_min_temp(),
            max_temp: default_max_temp(),
            step: default_step(),
            refresh_time_ms: default_refresh_time_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyACM0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_reconnect_interval_ms() -> u64 { 1000 }
fn default_line_delimiter() -> String { "\n".to_string() }
fn default_max_line_length() -> usize { 1024 }

fn default_name() -> String { "Thermostat".to_string() }
fn default_min_temp() -> f32 { 0.0 }
fn default_max_temp() -> f32 { 30.0 }
fn default_step() -> f32 { 0.5 }
fn default_refresh_time_ms() -> u64 { 120_000 }
fn default_read_timeout_ms() -> u64 { 30_000 }

fn default_rf_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_rf_baud_rate() -> u32 { 115200 }
fn default_repeat_count() -> u8 { 5 }

fn default_log_level() -> String { "info".to_string() }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rf_thermostat::config::Config;
    ///
    /// let config = Config::load("config/thermostat.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if ![9600, 19200, 38400, 57600, 115200].contains(&self.serial.baud_rate) {
            return Err(invalid(
                "serial baud_rate must be one of: 9600, 19200, 38400, 57600, 115200",
            ));
        }

        if self.serial.reconnect_interval_ms == 0 || self.serial.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        if self.serial.line_delimiter.is_empty() {
            return Err(invalid("line_delimiter cannot be empty"));
        }

        if self.serial.max_line_length == 0 {
            return Err(invalid("max_line_length must be greater than 0"));
        }

        if !(self.thermostat.step > 0.0) {
            return Err(invalid("step must be greater than 0"));
        }

        if self.thermostat.min_temp >= self.thermostat.max_temp {
            return Err(invalid("min_temp must be less than max_temp"));
        }

        if self.thermostat.refresh_time_ms == 0 {
            return Err(invalid("refresh_time_ms must be greater than 0"));
        }

        if self.rf.port.is_empty() {
            return Err(invalid("rf port cannot be empty"));
        }

        EmitterId::new(self.rf.emitter_id).map_err(|e| invalid(e.to_string()))?;
        DeviceId::new(self.rf.device_id).map_err(|e| invalid(e.to_string()))?;

        if self.rf.repeat_count == 0 || self.rf.repeat_count > 20 {
            return Err(invalid("repeat_count must be between 1 and 20"));
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!(
                "log level '{}' must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        if matches!(&self.logging.directory, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging directory cannot be empty when set"));
        }

        Ok(())
    }
}

impl SerialConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl ThermostatConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_time_ms)
    }

    /// `None` when reads should wait indefinitely
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }
}

fn invalid(msg: impl std::fmt::Display) -> ThermostatError {
    ThermostatError::Config(toml::de::Error::custom(msg))
}
