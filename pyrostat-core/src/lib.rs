//! Board-agnostic control and monitoring kernel for the pit controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (clock, ADC, PWM, servo, buzzer, session storage)
//! - PID regulator with lid-open suppression
//! - Split-range actuator mapping
//! - Alarm state machine with acknowledge hysteresis
//! - Error detection (probe faults, fire-out, link loss)
//! - Meat-completion predictor (least-squares trend)
//! - Cook-session recorder with crash recovery
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod alarm;
pub mod config;
pub mod control;
pub mod error;
pub mod predict;
pub mod probe;
pub mod session;
pub mod traits;
