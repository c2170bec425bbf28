//! Closed-loop pit regulation
//!
//! The regulator produces one scalar output (0-100 %); the split-range
//! mapper divides it between the damper and the fan.

pub mod pid;
pub mod split;

pub use pid::PitPid;
pub use split::split_range;
