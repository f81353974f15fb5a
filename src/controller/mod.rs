//! # Controller Module
//!
//! Thermostat state, characteristic accessors and the debounced heating
//! decision.
//!
//! This module handles:
//! - Getters/setters for every exposed thermostat characteristic
//! - Live temperature/humidity reads correlated with the next telemetry sample
//! - Deciding whether the heater should run and emitting the RF order,
//!   at most once per refresh interval

pub mod characteristic;
pub mod state;

pub use characteristic::{
    CurrentHeatingCoolingState, TargetHeatingCoolingState, TemperatureDisplayUnits,
};
pub use state::{quantize, ThermostatState};

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::{RfConfig, ThermostatConfig};
use crate::error::Result;
use crate::rf::{DeviceId, EmitterId, RfCommandChannel, RfOrder};
use crate::telemetry::broker::TelemetryBroker;
use crate::telemetry::TelemetrySample;

/// Fixed parameters the controller runs with
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub step: f32,
    pub refresh_interval: Duration,
    pub read_timeout: Option<Duration>,
    pub emitter_id: EmitterId,
    pub device_id: DeviceId,
}

impl ControllerSettings {
    /// # Errors
    ///
    /// Returns `RfAddress` if the configured emitter or device id is out of range
    pub fn from_config(thermostat: &ThermostatConfig, rf: &RfConfig) -> Result<Self> {
        Ok(Self {
            step: thermostat.step,
            refresh_interval: thermostat.refresh_interval(),
            read_timeout: thermostat.read_timeout(),
            emitter_id: EmitterId::new(rf.emitter_id)?,
            device_id: DeviceId::new(rf.device_id)?,
        })
    }
}

/// Shared handle to the thermostat
///
/// Cloning is cheap and every clone sees the same state, so accessory calls
/// and the driver can hold their own copy. The state lock is never held
/// across an `.await`.
#[derive(Debug, Clone)]
pub struct ThermostatController {
    state: Arc<Mutex<ThermostatState>>,
    settings: Arc<ControllerSettings>,
    broker: Arc<TelemetryBroker>,
    rf: Arc<RfCommandChannel>,
}

impl ThermostatController {
    pub fn new(
        settings: ControllerSettings,
        broker: Arc<TelemetryBroker>,
        rf: Arc<RfCommandChannel>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ThermostatState::new(Instant::now()))),
            settings: Arc::new(settings),
            broker,
            rf,
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn broker(&self) -> &Arc<TelemetryBroker> {
        &self.broker
    }

    pub fn current_heating_cooling_state(&self) -> CurrentHeatingCoolingState {
        self.state.lock().current_heating_cooling_state
    }

    pub fn set_current_heating_cooling_state(&self, value: CurrentHeatingCoolingState) {
        self.state.lock().current_heating_cooling_state = value;
    }

    pub fn target_heating_cooling_state(&self) -> TargetHeatingCoolingState {
        self.state.lock().target_heating_cooling_state
    }

    /// Set the requested mode; `None` leaves the state untouched
    pub fn set_target_heating_cooling_state(&self, value: Option<TargetHeatingCoolingState>) {
        let Some(value) = value else {
            debug!("Target heating/cooling state set without a value, ignoring");
            return;
        };
        self.state.lock().target_heating_cooling_state = value;
        info!("Target heating/cooling state set to {:?}", value);
    }

    /// Raw characteristic form of [`Self::set_target_heating_cooling_state`]
    ///
    /// # Errors
    ///
    /// Returns `InvalidCharacteristic` for codes outside 0..=3
    pub fn set_target_heating_cooling_state_value(&self, value: Option<u8>) -> Result<()> {
        let state = value.map(TargetHeatingCoolingState::try_from).transpose()?;
        self.set_target_heating_cooling_state(state);
        Ok(())
    }

    /// Temperature reported by the next telemetry sample
    ///
    /// Waits for a fresh sample rather than answering from cache. The cached
    /// current temperature is updated as a side effect.
    ///
    /// # Errors
    ///
    /// - `ReadTimeout` if no sample arrives within the configured read timeout
    /// - `ReadCancelled` if a later read took over the pending slot
    pub async fn current_temperature(&self) -> Result<Option<f32>> {
        let sample = self
            .broker
            .on_next_sample()
            .wait(self.settings.read_timeout)
            .await?;

        if let Some(temperature) = sample.temperature {
            self.state.lock().current_temperature = quantize(temperature, self.settings.step);
        }
        Ok(sample.temperature)
    }

    pub fn target_temperature(&self) -> f32 {
        self.state.lock().target_temperature
    }

    pub fn set_target_temperature(&self, value: f32) {
        let value = quantize(value, self.settings.step);
        self.state.lock().target_temperature = value;
        info!("Target temperature set to {:.1}°C", value);
    }

    pub fn temperature_display_units(&self) -> TemperatureDisplayUnits {
        TemperatureDisplayUnits::Celsius
    }

    /// Humidity reported by the next telemetry sample
    ///
    /// # Errors
    ///
    /// Same as [`Self::current_temperature`]
    pub async fn current_relative_humidity(&self) -> Result<Option<f32>> {
        let sample = self
            .broker
            .on_next_sample()
            .wait(self.settings.read_timeout)
            .await?;
        Ok(sample.humidity)
    }

    pub fn heating_threshold_temperature(&self) -> f32 {
        self.state.lock().heating_threshold_temperature
    }

    pub fn set_heating_threshold_temperature(&self, value: f32) {
        let value = quantize(value, self.settings.step);
        self.state.lock().heating_threshold_temperature = value;
        info!("Heating threshold set to {:.1}°C", value);
    }

    /// Fold a telemetry sample into the cached readings
    pub fn ingest_sample(&self, sample: &TelemetrySample) {
        let mut state = self.state.lock();
        if let Some(temperature) = sample.temperature {
            state.current_temperature = quantize(temperature, self.settings.step);
        }
        if let Some(humidity) = sample.humidity {
            state.current_humidity = Some(humidity);
        }
    }

    pub fn should_turn_on_heating(&self) -> bool {
        self.state.lock().should_turn_on_heating()
    }

    /// Decide and emit an RF order unless one went out within the refresh interval
    ///
    /// # Returns
    ///
    /// * `Option<RfOrder>` - The transmitted order, `None` while debounced
    pub async fn update_state(&self) -> Option<RfOrder> {
        self.update_state_at(Instant::now()).await
    }

    /// [`Self::update_state`] against an explicit clock reading
    pub async fn update_state_at(&self, now: Instant) -> Option<RfOrder> {
        let order = {
            let mut state = self.state.lock();
            let elapsed = now.saturating_duration_since(state.last_command_time);
            if elapsed < self.settings.refresh_interval {
                return None;
            }

            let on = state.should_turn_on_heating();
            state.last_command_time = now;
            debug!(
                "Heating decision: current={:.1} target={:.1} threshold={:.1} mode={:?} -> {}",
                state.current_temperature,
                state.target_temperature,
                state.heating_threshold_temperature,
                state.target_heating_cooling_state,
                if on { "on" } else { "off" }
            );
            self.rf
                .build_order(self.settings.emitter_id, self.settings.device_id, on)
        };

        self.rf.transmit(&order).await;
        Some(order)
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ThermostatState {
        self.state.lock().clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ThermostatError;
    use crate::rf::encode_transmit_frame;
    use crate::serial::port_trait::mocks::MockSerialPort;

    pub(crate) const REFRESH: Duration = Duration::from_millis(100);
    pub(crate) const REPEAT: u8 = 5;

    pub(crate) fn create_controller(read_timeout: Option<Duration>) -> (ThermostatController, MockSerialPort) {
        let mock = MockSerialPort::new();
        let settings = ControllerSettings {
            step: 0.5,
            refresh_interval: REFRESH,
            read_timeout,
            emitter_id: EmitterId::new(12_345_678).unwrap(),
            device_id: DeviceId::new(2).unwrap(),
        };
        let controller = ThermostatController::new(
            settings,
            Arc::new(TelemetryBroker::new()),
            Arc::new(RfCommandChannel::new(Box::new(mock.clone()), REPEAT)),
        );
        (controller, mock)
    }

    async fn wait_for_pending(controller: &ThermostatController) {
        while !controller.broker.has_pending() {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_settings_from_config() {
        let thermostat = ThermostatConfig::default();
        let rf = RfConfig {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            emitter_id: 42,
            device_id: 3,
            repeat_count: 5,
        };

        let settings = ControllerSettings::from_config(&thermostat, &rf).unwrap();
        assert_eq!(settings.refresh_interval, Duration::from_millis(120_000));
        assert_eq!(settings.read_timeout, Some(Duration::from_millis(30_000)));
        assert_eq!(settings.emitter_id.value(), 42);
        assert_eq!(settings.device_id.value(), 3);
    }

    #[test]
    fn test_settings_reject_bad_device_id() {
        let rf = RfConfig {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            emitter_id: 42,
            device_id: 16,
            repeat_count: 5,
        };

        assert!(matches!(
            ControllerSettings::from_config(&ThermostatConfig::default(), &rf),
            Err(ThermostatError::RfAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_update_state_is_debounced() {
        let (controller, mock) = create_controller(None);
        let first = Instant::now() + REFRESH;

        assert!(controller.update_state_at(first).await.is_some());
        assert!(controller
            .update_state_at(first + Duration::from_millis(10))
            .await
            .is_none());
        assert_eq!(mock.get_written_data().len(), 1);

        assert!(controller.update_state_at(first + REFRESH).await.is_some());
        assert_eq!(mock.get_written_data().len(), 2);
    }

    #[tokio::test]
    async fn test_no_order_right_after_construction() {
        let (controller, mock) = create_controller(None);

        assert!(controller.update_state().await.is_none());
        assert!(mock.get_written_data().is_empty());
    }

    #[tokio::test]
    async fn test_heat_below_target_sends_on_order() {
        let (controller, mock) = create_controller(None);
        controller.set_target_heating_cooling_state(Some(TargetHeatingCoolingState::Heat));
        controller.set_target_temperature(22.0);
        controller.ingest_sample(&TelemetrySample {
            temperature: Some(18.0),
            humidity: None,
        });
        assert!(controller.should_turn_on_heating());

        let now = Instant::now() + REFRESH;
        let order = controller.update_state_at(now).await.unwrap();

        assert!(order.on);
        assert_eq!(order.device_id.value(), 2);
        assert_eq!(mock.get_written_data(), vec![encode_transmit_frame(&order, REPEAT)]);
        assert_eq!(controller.snapshot().last_command_time, now);
    }

    #[tokio::test]
    async fn test_off_mode_sends_off_order() {
        let (controller, _mock) = create_controller(None);
        controller.set_target_heating_cooling_state(Some(TargetHeatingCoolingState::Off));
        controller.set_target_temperature(28.0);

        let order = controller
            .update_state_at(Instant::now() + REFRESH)
            .await
            .unwrap();
        assert!(!order.on);
    }

    #[test]
    fn test_missing_target_state_is_ignored() {
        let (controller, _mock) = create_controller(None);
        controller.set_target_heating_cooling_state(Some(TargetHeatingCoolingState::Heat));
        let before = controller.snapshot();

        controller.set_target_heating_cooling_state(None);
        assert!(controller.set_target_heating_cooling_state_value(None).is_ok());

        assert_eq!(controller.snapshot(), before);
    }

    #[test]
    fn test_raw_target_state_values() {
        let (controller, _mock) = create_controller(None);

        controller.set_target_heating_cooling_state_value(Some(2)).unwrap();
        assert_eq!(controller.target_heating_cooling_state(), TargetHeatingCoolingState::Cool);

        assert!(matches!(
            controller.set_target_heating_cooling_state_value(Some(7)),
            Err(ThermostatError::InvalidCharacteristic { value: 7, .. })
        ));
        assert_eq!(controller.target_heating_cooling_state(), TargetHeatingCoolingState::Cool);
    }

    #[test]
    fn test_setters_quantize() {
        let (controller, _mock) = create_controller(None);

        controller.set_target_temperature(21.3);
        controller.set_heating_threshold_temperature(18.8);

        assert_eq!(controller.target_temperature(), 21.5);
        assert_eq!(controller.heating_threshold_temperature(), 19.0);
    }

    #[test]
    fn test_simple_accessors() {
        let (controller, _mock) = create_controller(None);

        assert_eq!(controller.temperature_display_units(), TemperatureDisplayUnits::Celsius);
        assert_eq!(controller.current_heating_cooling_state(), CurrentHeatingCoolingState::Off);

        controller.set_current_heating_cooling_state(CurrentHeatingCoolingState::Heat);
        assert_eq!(controller.current_heating_cooling_state(), CurrentHeatingCoolingState::Heat);
    }

    #[test]
    fn test_ingest_keeps_missing_fields() {
        let (controller, _mock) = create_controller(None);
        controller.ingest_sample(&TelemetrySample {
            temperature: Some(19.2),
            humidity: Some(55.0),
        });
        controller.ingest_sample(&TelemetrySample::default());

        let state = controller.snapshot();
        assert_eq!(state.current_temperature, 19.0);
        assert_eq!(state.current_humidity, Some(55.0));
    }

    #[tokio::test]
    async fn test_current_temperature_waits_for_next_sample() {
        let (controller, _mock) = create_controller(None);
        let reader = controller.clone();
        let read = tokio::spawn(async move { reader.current_temperature().await });

        wait_for_pending(&controller).await;
        assert!(controller.broker.publish(&TelemetrySample {
            temperature: Some(21.5),
            humidity: Some(40.0),
        }));

        assert_eq!(read.await.unwrap().unwrap(), Some(21.5));
        assert_eq!(controller.snapshot().current_temperature, 21.5);

        // Resolved read is not affected by later samples
        assert!(!controller.broker.publish(&TelemetrySample {
            temperature: Some(25.0),
            humidity: Some(10.0),
        }));
        assert_eq!(controller.snapshot().current_temperature, 21.5);
    }

    #[tokio::test]
    async fn test_current_relative_humidity_waits_for_next_sample() {
        let (controller, _mock) = create_controller(None);
        let reader = controller.clone();
        let read = tokio::spawn(async move { reader.current_relative_humidity().await });

        wait_for_pending(&controller).await;
        controller.broker.publish(&TelemetrySample {
            temperature: Some(21.5),
            humidity: Some(40.0),
        });

        assert_eq!(read.await.unwrap().unwrap(), Some(40.0));
    }

    #[tokio::test]
    async fn test_current_temperature_times_out() {
        let (controller, _mock) = create_controller(Some(Duration::from_millis(20)));

        assert!(matches!(
            controller.current_temperature().await,
            Err(ThermostatError::ReadTimeout(_))
        ));
        assert_eq!(controller.snapshot().current_temperature, 20.0);
    }
}
