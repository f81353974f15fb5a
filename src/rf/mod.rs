//! # RF Command Module
//!
//! Turns heater on/off decisions into DiO (Chacon) 433 MHz orders.
//!
//! This module handles:
//! - Building deterministic code words from (emitter id, device id, on/off)
//! - Framing them for the serial RF bridge (CRC8-DVB-S2 protected)
//! - Fire-and-forget transmission: the medium has no acknowledgement

pub mod crc;
pub mod encoder;
pub mod protocol;

pub use encoder::{build_order, encode_transmit_frame};
pub use protocol::{DeviceId, EmitterId, RfOrder};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::RfConfig;
use crate::error::{Result, ThermostatError};
use crate::serial::port_trait::{SerialPortIO, TokioSerialPort};

/// Encode + send path to the RF medium
///
/// Holds no decision state, only the handle to the bridge and how many times
/// the bridge should repeat each code word on air.
pub struct RfCommandChannel {
    port: Mutex<Box<dyn SerialPortIO>>,
    repeat_count: u8,
}

impl std::fmt::Debug for RfCommandChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RfCommandChannel")
            .field("repeat_count", &self.repeat_count)
            .finish_non_exhaustive()
    }
}

impl RfCommandChannel {
    pub fn new(port: Box<dyn SerialPortIO>, repeat_count: u8) -> Self {
        Self {
            port: Mutex::new(port),
            repeat_count,
        }
    }

    /// Open the RF bridge tty described by `config`
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the bridge cannot be opened
    pub fn open(config: &RfConfig) -> Result<Self> {
        let port = TokioSerialPort::open(&config.port, config.baud_rate).map_err(|e| {
            ThermostatError::Serial(format!(
                "Failed to open RF bridge {}: {}",
                config.port, e
            ))
        })?;
        Ok(Self::new(Box::new(port), config.repeat_count))
    }

    /// Build an order for the given addressing (see [`encoder::build_order`])
    pub fn build_order(&self, emitter_id: EmitterId, device_id: DeviceId, on: bool) -> RfOrder {
        build_order(emitter_id, device_id, on)
    }

    /// Send `order` over the air
    ///
    /// Failures are only logged; the bridge never acknowledges an order.
    pub async fn transmit(&self, order: &RfOrder) {
        let frame = encode_transmit_frame(order, self.repeat_count);
        let mut port = self.port.lock().await;

        let sent = match port.write_all(&frame).await {
            Ok(()) => port.flush().await,
            Err(e) => Err(e),
        };

        match sent {
            Ok(()) => debug!("Transmitted RF order {} ({} bytes)", order, frame.len()),
            Err(e) => warn!("Failed to transmit RF order {}: {}", order, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port_trait::mocks::MockSerialPort;
    use protocol::BRIDGE_SYNC_BYTE;

    fn address() -> (EmitterId, DeviceId) {
        (EmitterId::new(12_345_678).unwrap(), DeviceId::new(2).unwrap())
    }

    #[tokio::test]
    async fn test_transmit_writes_bridge_frame() {
        let mock = MockSerialPort::new();
        let channel = RfCommandChannel::new(Box::new(mock.clone()), 3);
        let (emitter, device) = address();

        let order = channel.build_order(emitter, device, true);
        channel.transmit(&order).await;

        let written = mock.get_written_data();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0], encode_transmit_frame(&order, 3));
        assert_eq!(written[0][0], BRIDGE_SYNC_BYTE);
        assert_eq!(written[0][7], 3);
    }

    #[tokio::test]
    async fn test_transmit_failure_is_swallowed() {
        let mock = MockSerialPort::new();
        mock.set_write_error(std::io::ErrorKind::BrokenPipe);
        let channel = RfCommandChannel::new(Box::new(mock.clone()), 5);
        let (emitter, device) = address();

        channel
            .transmit(&channel.build_order(emitter, device, false))
            .await;

        assert!(mock.get_written_data().is_empty());
    }

    #[test]
    fn test_build_order_matches_encoder() {
        let channel = RfCommandChannel::new(Box::new(MockSerialPort::new()), 5);
        let (emitter, device) = address();

        assert_eq!(
            channel.build_order(emitter, device, true),
            build_order(emitter, device, true)
        );
    }

    #[test]
    fn test_open_missing_bridge_returns_error() {
        let config = RfConfig {
            port: "/dev/nonexistent_rf_bridge_12345".to_string(),
            baud_rate: 115200,
            emitter_id: 1,
            device_id: 1,
            repeat_count: 5,
        };

        match RfCommandChannel::open(&config) {
            Err(ThermostatError::Serial(msg)) => {
                assert!(msg.contains("/dev/nonexistent_rf_bridge_12345"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }
}
