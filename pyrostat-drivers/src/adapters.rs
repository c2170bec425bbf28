//! Adapters bridging embedded-hal peripherals to the capability traits
//!
//! Board crates that already expose embedded-hal 1.0 peripherals can wrap
//! them here instead of implementing the core traits by hand.

use embedded_hal::pwm::SetDutyCycle;

use pyrostat_core::traits::PwmOutput;

/// Wraps any embedded-hal PWM channel as the fan output
///
/// The core's 8-bit duty is mapped onto the channel's own duty range.
#[derive(Debug)]
pub struct HalPwm<T>(pub T);

impl<T: SetDutyCycle> PwmOutput for HalPwm<T> {
    fn set_duty(&mut self, duty: u8) {
        // A failed write leaves the previous duty in place
        let _ = self.0.set_duty_cycle_fraction(duty as u16, 255);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct FakeChannel {
        duty: u16,
        max: u16,
    }

    impl embedded_hal::pwm::ErrorType for FakeChannel {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakeChannel {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_duty_scales_to_channel_range() {
        let mut pwm = HalPwm(FakeChannel { duty: 0, max: 1_020 });

        pwm.set_duty(255);
        assert_eq!(pwm.0.duty, 1_020);

        pwm.set_duty(0);
        assert_eq!(pwm.0.duty, 0);

        // 25 % of the channel range
        pwm.set_duty(64);
        assert_eq!(pwm.0.duty, 256);
    }
}
