//! Butterfly damper actuator
//!
//! Maps a 0-100 % damper position linearly onto the configured servo angle
//! span, then onto a pulse width over the servo's 0-180 degree range. The
//! board repeats the pulse at the 50 Hz servo frame rate; the driver only
//! rewrites the width when the commanded position changes.

use libm::roundf;

use pyrostat_core::config::DamperSettings;
use pyrostat_core::traits::ServoOutput;

/// Damper servo actuator
#[derive(Debug)]
pub struct DamperActuator<S> {
    servo: S,
    settings: DamperSettings,
    position_pct: u8,
    angle_deg: f32,
    pulse_us: u16,
    last_pulse_us: Option<u16>,
}

impl<S: ServoOutput> DamperActuator<S> {
    /// Create a damper driver; call [`set_position`](Self::set_position)
    /// to command the first pulse
    pub fn new(servo: S, settings: DamperSettings) -> Self {
        let closed = settings.closed_angle;
        Self {
            servo,
            settings,
            position_pct: 0,
            angle_deg: closed,
            pulse_us: 0,
            last_pulse_us: None,
        }
    }

    /// Commanded position percent
    pub fn position_percent(&self) -> u8 {
        self.position_pct
    }

    /// Current servo angle in degrees
    pub fn angle_degrees(&self) -> f32 {
        self.angle_deg
    }

    /// Current pulse width in microseconds
    pub fn pulse_us(&self) -> u16 {
        self.pulse_us
    }

    /// Command a damper position
    pub fn set_position(&mut self, pct: u8) {
        let pct = pct.min(100);
        self.position_pct = pct;

        let span = self.settings.open_angle - self.settings.closed_angle;
        self.angle_deg = self.settings.closed_angle + span * pct as f32 / 100.0;

        let range = (self.settings.max_pulse_us - self.settings.min_pulse_us) as f32;
        let us = self.settings.min_pulse_us as f32
            + self.angle_deg.clamp(0.0, 180.0) / 180.0 * range;
        self.pulse_us = roundf(us) as u16;

        if self.last_pulse_us != Some(self.pulse_us) {
            self.servo.set_pulse_us(self.pulse_us);
            self.last_pulse_us = Some(self.pulse_us);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockServo {
        pulse_us: u16,
        writes: u32,
    }

    impl MockServo {
        fn new() -> Self {
            Self {
                pulse_us: 0,
                writes: 0,
            }
        }
    }

    impl ServoOutput for &mut MockServo {
        fn set_pulse_us(&mut self, us: u16) {
            self.pulse_us = us;
            self.writes += 1;
        }
    }

    #[test]
    fn test_closed_and_open_endpoints() {
        let mut servo = MockServo::new();
        let mut damper = DamperActuator::new(&mut servo, DamperSettings::default());

        // 0 %: closed angle 0 degrees = 500 us
        damper.set_position(0);
        assert_eq!(damper.angle_degrees(), 0.0);
        assert_eq!(damper.pulse_us(), 500);

        // 100 %: open angle 90 degrees = halfway through the pulse range
        damper.set_position(100);
        assert_eq!(damper.angle_degrees(), 90.0);
        assert_eq!(damper.pulse_us(), 1_500);
    }

    #[test]
    fn test_midpoint() {
        let mut servo = MockServo::new();
        let mut damper = DamperActuator::new(&mut servo, DamperSettings::default());

        damper.set_position(50);
        assert_eq!(damper.angle_degrees(), 45.0);
        assert_eq!(damper.pulse_us(), 1_000);
    }

    #[test]
    fn test_position_clamps_to_100() {
        let mut servo = MockServo::new();
        let mut damper = DamperActuator::new(&mut servo, DamperSettings::default());

        damper.set_position(250);
        assert_eq!(damper.position_percent(), 100);
    }

    #[test]
    fn test_offset_angle_span() {
        // A damper mounted so closed is 10 degrees and open is 130
        let settings = DamperSettings {
            closed_angle: 10.0,
            open_angle: 130.0,
            min_pulse_us: 1_000,
            max_pulse_us: 2_000,
        };
        let mut servo = MockServo::new();
        let mut damper = DamperActuator::new(&mut servo, settings);

        damper.set_position(0);
        assert_eq!(damper.angle_degrees(), 10.0);
        // 10/180 of the 1000 us range above the minimum
        assert_eq!(damper.pulse_us(), 1_056);

        damper.set_position(100);
        assert_eq!(damper.angle_degrees(), 130.0);
        assert_eq!(damper.pulse_us(), 1_722);
    }

    #[test]
    fn test_pulse_written_only_on_change() {
        let mut servo = MockServo::new();
        {
            let mut damper = DamperActuator::new(&mut servo, DamperSettings::default());
            damper.set_position(50);
            damper.set_position(50);
            damper.set_position(50);
            damper.set_position(60);
        }
        assert_eq!(servo.writes, 2);
    }
}
