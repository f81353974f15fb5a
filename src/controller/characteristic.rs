//! # Thermostat Characteristics
//!
//! Closed enumerations for the thermostat characteristics exposed to the
//! accessory framework, with their raw wire codes.
//!
//! | Characteristic | Codes |
//! |----------------|-------|
//! | CurrentHeatingCoolingState | 0 Off, 1 Heat, 2 Cool |
//! | TargetHeatingCoolingState | 0 Off, 1 Heat, 2 Cool, 3 Auto |
//! | TemperatureDisplayUnits | 0 Celsius, 1 Fahrenheit |

use crate::error::ThermostatError;

/// What the heater/cooler is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CurrentHeatingCoolingState {
    #[default]
    Off = 0,
    Heat = 1,
    Cool = 2,
}

/// What the user asked the thermostat to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TargetHeatingCoolingState {
    Off = 0,
    Heat = 1,
    Cool = 2,
    /// Heat against the heating threshold instead of the target temperature
    #[default]
    Auto = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TemperatureDisplayUnits {
    #[default]
    Celsius = 0,
    Fahrenheit = 1,
}

impl TryFrom<u8> for CurrentHeatingCoolingState {
    type Error = ThermostatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::Heat),
            2 => Ok(Self::Cool),
            _ => Err(ThermostatError::InvalidCharacteristic {
                characteristic: "CurrentHeatingCoolingState",
                value,
            }),
        }
    }
}

impl TryFrom<u8> for TargetHeatingCoolingState {
    type Error = ThermostatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::Heat),
            2 => Ok(Self::Cool),
            3 => Ok(Self::Auto),
            _ => Err(ThermostatError::InvalidCharacteristic {
                characteristic: "TargetHeatingCoolingState",
                value,
            }),
        }
    }
}

impl TryFrom<u8> for TemperatureDisplayUnits {
    type Error = ThermostatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Celsius),
            1 => Ok(Self::Fahrenheit),
            _ => Err(ThermostatError::InvalidCharacteristic {
                characteristic: "TemperatureDisplayUnits",
                value,
            }),
        }
    }
}
