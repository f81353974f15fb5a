//! # RF Order Constants and Types
//!
//! Addressing limits for DiO 1.0 (Chacon / HomeEasy) switches and the frame
//! layout understood by the serial 433 MHz bridge.

use std::fmt;

use crate::error::{Result, ThermostatError};

/// Width of the emitter (remote) identifier in the DiO code word
pub const EMITTER_ID_BITS: u32 = 26;

/// Largest emitter id that fits in the code word
pub const EMITTER_ID_MAX: u32 = (1 << EMITTER_ID_BITS) - 1;

/// Largest device (unit) id that fits in the code word
pub const DEVICE_ID_MAX: u8 = 0x0F;

/// Position of the group flag in the code word
pub const GROUP_FLAG_SHIFT: u32 = 5;

/// Position of the on/off flag in the code word
pub const ON_FLAG_SHIFT: u32 = 4;

/// Bridge frame sync byte
pub const BRIDGE_SYNC_BYTE: u8 = 0xA5;

/// Bridge command: transmit one DiO code word
pub const BRIDGE_CMD_TRANSMIT_DIO: u8 = 0x01;

/// Bridge frame length field (cmd + code word + repeats + crc)
pub const BRIDGE_TRANSMIT_FRAME_LENGTH: u8 = 0x07;

/// Complete bridge frame size (sync + length + 7)
pub const BRIDGE_TRANSMIT_FRAME_SIZE: usize = 9;

/// 26-bit emitter identifier of the simulated remote control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterId(u32);

impl EmitterId {
    /// # Errors
    ///
    /// Returns `RfAddress` if `id` does not fit in 26 bits
    pub fn new(id: u32) -> Result<Self> {
        if id > EMITTER_ID_MAX {
            return Err(ThermostatError::RfAddress(format!(
                "emitter_id {} exceeds maximum {}",
                id, EMITTER_ID_MAX
            )));
        }
        Ok(Self(id))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// 4-bit unit code of the receiver paired with the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(u8);

impl DeviceId {
    /// # Errors
    ///
    /// Returns `RfAddress` if `id` is above 15
    pub fn new(id: u8) -> Result<Self> {
        if id > DEVICE_ID_MAX {
            return Err(ThermostatError::RfAddress(format!(
                "device_id {} exceeds maximum {}",
                id, DEVICE_ID_MAX
            )));
        }
        Ok(Self(id))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// An encoded on/off order for one emitter/device pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfOrder {
    pub emitter_id: EmitterId,
    pub device_id: DeviceId,
    pub on: bool,
    /// DiO 32-bit code word, sent MSB first on air
    pub code: u32,
}

impl fmt::Display for RfOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} emitter={} device={} (0x{:08X})",
            if self.on { "ON" } else { "OFF" },
            self.emitter_id.value(),
            self.device_id.value(),
            self.code
        )
    }
}
