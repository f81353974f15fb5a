//! # Driver Module
//!
//! Single dispatch queue between the serial link and the controller.
//!
//! Every telemetry event is handled to completion before the next one is
//! taken, and the refresh timer shares the same loop, so state transitions
//! never interleave.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::controller::ThermostatController;
use crate::telemetry::broker::TelemetryBroker;
use crate::telemetry::TelemetryEvent;

/// Feeds telemetry into the broker and controller and keeps the heater order fresh
#[derive(Debug, Clone)]
pub struct ThermostatDriver {
    controller: ThermostatController,
    broker: Arc<TelemetryBroker>,
}

impl ThermostatDriver {
    pub fn new(controller: ThermostatController, broker: Arc<TelemetryBroker>) -> Self {
        Self { controller, broker }
    }

    pub fn controller(&self) -> &ThermostatController {
        &self.controller
    }

    /// Process one event from the link
    ///
    /// Samples are offered to a pending read first, then cached, then given
    /// a chance to trigger an RF order. Decode errors change nothing.
    pub async fn handle_event(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Sample(sample) => {
                if self.broker.publish(&sample) {
                    debug!("Telemetry sample delivered to pending read");
                }
                self.controller.ingest_sample(&sample);
                self.controller.update_state().await;
            }
            TelemetryEvent::DecodeError { line, error } => {
                debug!("Ignoring undecodable telemetry line '{}': {}", line, error);
            }
        }
    }

    /// Run until the link drops its sender
    ///
    /// # Arguments
    ///
    /// * `events` - Receiving end of the link's event channel
    /// * `refresh_interval` - Period of the `update_state` timer
    pub async fn run(self, mut events: mpsc::Receiver<TelemetryEvent>, refresh_interval: Duration) {
        let mut refresh = interval(refresh_interval);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Thermostat driver started (refresh every {:?})", refresh_interval);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },

                _ = refresh.tick() => {
                    if let Some(order) = self.controller.update_state().await {
                        debug!("Refresh timer sent {}", order);
                    }
                }
            }
        }

        info!("Telemetry channel closed, driver stopping");
    }
}
