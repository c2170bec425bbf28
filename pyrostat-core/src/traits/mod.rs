//! Capability traits
//!
//! Every subsystem that reads a clock or touches a peripheral takes its
//! dependency as one of these traits. Board crates supply the real
//! implementations; tests supply deterministic fakes.

pub mod outputs;
pub mod sensor;
pub mod storage;
pub mod time;

pub use outputs::{Buzzer, PwmOutput, ServoOutput};
pub use sensor::AdcReader;
pub use storage::{SessionStore, StoreError};
pub use time::Clock;
