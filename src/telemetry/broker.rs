//! # Telemetry Broker
//!
//! Bridges the asynchronous sample stream to "give me the next sample"
//! requests from characteristic getters.
//!
//! The broker keeps a single pending slot. Registering swaps the slot, so the
//! last registration wins and the replaced reader resolves with
//! [`ThermostatError::ReadCancelled`]. Publishing takes the slot, so each
//! reader is served at most once. Samples published while nobody waits are
//! dropped, not buffered.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use super::TelemetrySample;
use crate::error::{Result, ThermostatError};

/// Single-slot, one-shot subscription register
#[derive(Debug, Default)]
pub struct TelemetryBroker {
    pending: Mutex<Option<oneshot::Sender<TelemetrySample>>>,
}

/// A registered read, resolved by the next published sample
#[derive(Debug)]
pub struct PendingRead {
    rx: oneshot::Receiver<TelemetrySample>,
}

impl TelemetryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register for the very next sample, replacing any earlier registration
    ///
    /// # Examples
    ///
    /// ```
    /// use rf_thermostat::telemetry::{broker::TelemetryBroker, TelemetrySample};
    ///
    /// # tokio_test::block_on(async {
    /// let broker = TelemetryBroker::new();
    /// let read = broker.on_next_sample();
    ///
    /// broker.publish(&TelemetrySample { temperature: Some(21.5), humidity: None });
    /// let sample = read.wait(None).await.unwrap();
    /// assert_eq!(sample.temperature, Some(21.5));
    /// # });
    /// ```
    pub fn on_next_sample(&self) -> PendingRead {
        let (tx, rx) = oneshot::channel();
        if self.pending.lock().replace(tx).is_some() {
            debug!("Replacing pending telemetry read with a newer one");
        }
        PendingRead { rx }
    }

    /// Deliver `sample` to the pending reader, if any
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if a live reader received the sample
    pub fn publish(&self, sample: &TelemetrySample) -> bool {
        let Some(tx) = self.pending.lock().take() else {
            return false;
        };
        tx.send(*sample).is_ok()
    }

    /// Whether a reader is currently registered and still waiting
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

impl PendingRead {
    /// Wait for the sample
    ///
    /// # Arguments
    ///
    /// * `timeout` - Give up after this long; `None` waits until a sample arrives
    ///
    /// # Errors
    ///
    /// - `ReadTimeout` if the deadline passes first
    /// - `ReadCancelled` if a newer registration replaced this one
    pub async fn wait(self, timeout: Option<Duration>) -> Result<TelemetrySample> {
        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, self.rx)
                .await
                .map_err(|_| ThermostatError::ReadTimeout(limit))?,
            None => self.rx.await,
        };

        received.map_err(|_| ThermostatError::ReadCancelled)
    }
}
