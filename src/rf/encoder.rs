//! # RF Order Encoder
//!
//! Builds DiO code words and wraps them into bridge frames.

use super::crc::crc8_dvb_s2;
use super::protocol::*;

/// Build an on/off order addressed to `device_id` of `emitter_id`
///
/// The code word is laid out MSB first:
///
/// ```text
/// bits 31..6  emitter id (26 bits)
/// bit  5      group flag (always 0, single device)
/// bit  4      on/off
/// bits 3..0   device id
/// ```
///
/// # Examples
///
/// ```
/// use rf_thermostat::rf::{build_order, DeviceId, EmitterId};
///
/// let order = build_order(EmitterId::new(1)?, DeviceId::new(2)?, true);
/// assert_eq!(order.code, 0b0100_0000 | 0b1_0000 | 2);
/// # Ok::<(), rf_thermostat::error::ThermostatError>(())
/// ```
pub fn build_order(emitter_id: EmitterId, device_id: DeviceId, on: bool) -> RfOrder {
    // Group flag stays clear: orders always target a single device
    let code = (emitter_id.value() << (32 - EMITTER_ID_BITS))
        | (u32::from(on) << ON_FLAG_SHIFT)
        | u32::from(device_id.value());

    RfOrder {
        emitter_id,
        device_id,
        on,
        code,
    }
}

/// Wrap an order into a complete bridge frame
///
/// # Returns
///
/// * `Vec<u8>` - 9 bytes: sync + length + cmd + code word (BE) + repeats + crc
pub fn encode_transmit_frame(order: &RfOrder, repeat_count: u8) -> Vec<u8> {
    let mut frame = Vec::with_capacity(BRIDGE_TRANSMIT_FRAME_SIZE);
    frame.push(BRIDGE_SYNC_BYTE);
    frame.push(BRIDGE_TRANSMIT_FRAME_LENGTH);
    frame.push(BRIDGE_CMD_TRANSMIT_DIO);
    frame.extend_from_slice(&order.code.to_be_bytes());
    frame.push(repeat_count);

    // CRC over Length + Cmd + Code + Repeats
    let crc = crc8_dvb_s2(&frame[1..]);
    frame.push(crc);

    frame
}
