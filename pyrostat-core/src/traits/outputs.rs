//! Actuator output abstractions

/// PWM duty output for the blower fan
///
/// The carrier (25 kHz on the reference hardware) is fixed by the board
/// crate; the core only sets the 8-bit duty.
pub trait PwmOutput {
    /// Set the PWM duty (0 = off, 255 = full)
    fn set_duty(&mut self, duty: u8);
}

/// Pulse-width output for the damper servo
///
/// The board crate repeats the pulse at the 50 Hz servo frame rate; the
/// core only sets the width.
pub trait ServoOutput {
    /// Set the servo pulse width in microseconds
    fn set_pulse_us(&mut self, us: u16);
}

/// Buzzer output
pub trait Buzzer {
    /// Start sounding at the given frequency
    fn tone_on(&mut self, freq_hz: u16);

    /// Stop sounding
    fn tone_off(&mut self);
}
