//! Component drivers and the control-loop orchestrator
//!
//! This crate provides the pieces of the controller that face hardware
//! through the capability traits defined in pyrostat-core:
//!
//! - Probe sampler (Steinhart-Hart conversion, open/short classification)
//! - Fan actuator (kick-start / long-pulse PWM state machine)
//! - Damper actuator (position to servo pulse mapping)
//! - Buzzer driver (edge-triggered tone output)
//! - Adapters for embedded-hal peripherals
//! - `PitController`, the orchestrator that owns every subsystem and runs
//!   the cooperative tick

#![no_std]
#![deny(unsafe_code)]

pub mod adapters;
pub mod buzzer;
pub mod controller;
pub mod damper;
pub mod fan;
pub mod probe;

pub use buzzer::BuzzerDriver;
pub use controller::{CommandError, PitController};
pub use damper::DamperActuator;
pub use fan::{FanActuator, FanState};
pub use probe::{ProbeSampler, SteinhartHart};
