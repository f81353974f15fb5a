//! # RF Thermostat Library
//!
//! Drive a 433 MHz heater switch from a serial temperature/humidity sensor.
//!
//! This library provides the device-control loop behind a thermostat
//! accessory: a self-healing serial telemetry reader, one-shot correlation of
//! "read now" requests with the next sample, and a debounced heating decision
//! that is emitted as DiO RF orders.

pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod rf;
pub mod serial;
pub mod telemetry;
