//! # Thermostat State
//!
//! The mutable thermostat record and the heating decision predicate.

use std::time::Instant;

use super::characteristic::{CurrentHeatingCoolingState, TargetHeatingCoolingState};

/// Temperature every field starts at before the first reading or user change
pub const DEFAULT_TEMPERATURE: f32 = 20.0;

/// Snapshot of everything the controller tracks
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatState {
    pub current_temperature: f32,
    /// Setpoint used in `Heat` mode
    pub target_temperature: f32,
    /// Setpoint used in `Auto` mode
    pub heating_threshold_temperature: f32,
    pub current_humidity: Option<f32>,
    pub current_heating_cooling_state: CurrentHeatingCoolingState,
    pub target_heating_cooling_state: TargetHeatingCoolingState,
    /// When the last RF order went out (construction time before the first one)
    pub last_command_time: Instant,
}

impl ThermostatState {
    pub fn new(now: Instant) -> Self {
        Self {
            current_temperature: DEFAULT_TEMPERATURE,
            target_temperature: DEFAULT_TEMPERATURE,
            heating_threshold_temperature: DEFAULT_TEMPERATURE,
            current_humidity: None,
            current_heating_cooling_state: CurrentHeatingCoolingState::Off,
            target_heating_cooling_state: TargetHeatingCoolingState::Auto,
            last_command_time: now,
        }
    }

    /// Whether the heater should be running
    ///
    /// - `Heat`: below the target temperature
    /// - `Auto`: below the heating threshold
    /// - `Off` / `Cool`: never
    pub fn should_turn_on_heating(&self) -> bool {
        match self.target_heating_cooling_state {
            TargetHeatingCoolingState::Heat => self.current_temperature < self.target_temperature,
            TargetHeatingCoolingState::Auto => {
                self.current_temperature < self.heating_threshold_temperature
            }
            TargetHeatingCoolingState::Off | TargetHeatingCoolingState::Cool => false,
        }
    }
}

/// Round `value` to the nearest multiple of `step`
///
/// # Examples
///
/// ```
/// use rf_thermostat::controller::state::quantize;
///
/// assert_eq!(quantize(21.3, 0.5), 21.5);
/// assert_eq!(quantize(21.2, 0.5), 21.0);
/// ```
pub fn quantize(value: f32, step: f32) -> f32 {
    if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    }
}
