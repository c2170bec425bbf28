//! Blower fan actuator
//!
//! A small centrifugal blower on a 25 kHz PWM channel. Three quirks of real
//! blowers shape the state machine:
//!
//! - Static friction: a stopped rotor needs a brief high-duty kick before it
//!   will spin at all.
//! - A floor speed: below a minimum duty the rotor hums without moving air.
//! - Sub-floor demand: very low airflow targets are met by cycling between
//!   the floor speed and off (long-pulse) instead of stalling at an
//!   unachievable duty.

use pyrostat_core::config::FanSettings;
use pyrostat_core::traits::PwmOutput;

/// Fan actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanState {
    /// Rotor stopped; the next non-zero target kick-starts
    Off,
    /// High-duty pulse to break static friction
    Kickstart,
    /// Cycling between minimum speed and off for sub-floor targets
    LongPulse,
    /// Running at the clamped target speed
    Normal,
}

/// Fan actuator driving one PWM channel
#[derive(Debug)]
pub struct FanActuator<P> {
    pwm: P,
    settings: FanSettings,
    state: FanState,
    /// Requested speed percent
    target_pct: u8,
    /// Speed percent currently applied
    effective_pct: u8,
    duty: u8,
    manual: bool,
    kickstart_end_ms: u64,
    /// Long-pulse phase anchor, set once per entry into LongPulse
    cycle_start_ms: u64,
    last_duty: Option<u8>,
}

impl<P: PwmOutput> FanActuator<P> {
    /// Create a stopped fan
    pub fn new(pwm: P, settings: FanSettings) -> Self {
        Self {
            pwm,
            settings,
            state: FanState::Off,
            target_pct: 0,
            effective_pct: 0,
            duty: 0,
            manual: false,
            kickstart_end_ms: 0,
            cycle_start_ms: 0,
            last_duty: None,
        }
    }

    /// Current state
    pub fn state(&self) -> FanState {
        self.state
    }

    /// Requested speed percent
    pub fn target_percent(&self) -> u8 {
        self.target_pct
    }

    /// Speed percent currently applied (kick-start and cycling included)
    pub fn current_percent(&self) -> u8 {
        self.effective_pct
    }

    /// PWM duty currently applied
    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Whether the kick-start pulse is running
    pub fn is_kick_starting(&self) -> bool {
        self.state == FanState::Kickstart
    }

    /// Whether long-pulse cycling is running
    pub fn is_long_pulse(&self) -> bool {
        self.state == FanState::LongPulse
    }

    /// Whether a manual override is holding the fan
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Request a speed; ignored while a manual override holds the fan
    pub fn set_speed(&mut self, pct: u8) {
        if self.manual {
            return;
        }
        self.target_pct = pct.min(100);
    }

    /// Freeze the fan at a fixed duty until [`off`](Self::off) is called
    pub fn set_manual_duty(&mut self, duty: u8) {
        self.manual = true;
        self.state = FanState::Off;
        self.target_pct = 0;
        self.effective_pct = (duty as u16 * 100 / 255) as u8;
        self.write_duty(duty);
    }

    /// Stop immediately, clearing every flag including manual override
    ///
    /// The next non-zero target goes through a fresh kick-start.
    pub fn off(&mut self) {
        self.state = FanState::Off;
        self.target_pct = 0;
        self.effective_pct = 0;
        self.manual = false;
        self.kickstart_end_ms = 0;
        self.cycle_start_ms = 0;
        self.write_duty(0);
    }

    /// Advance the state machine and write the duty
    pub fn update(&mut self, now_ms: u64) {
        if self.manual {
            return;
        }

        self.state = match self.state {
            FanState::Off => {
                if self.target_pct > 0 {
                    self.kickstart_end_ms = now_ms + self.settings.kickstart_ms as u64;
                    FanState::Kickstart
                } else {
                    FanState::Off
                }
            }
            FanState::Kickstart => {
                if self.target_pct == 0 {
                    FanState::Off
                } else if now_ms >= self.kickstart_end_ms {
                    if self.target_pct < self.settings.long_pulse_threshold_pct {
                        self.cycle_start_ms = now_ms;
                        FanState::LongPulse
                    } else {
                        FanState::Normal
                    }
                } else {
                    FanState::Kickstart
                }
            }
            FanState::Normal => {
                if self.target_pct == 0 {
                    FanState::Off
                } else if self.target_pct < self.settings.long_pulse_threshold_pct {
                    self.cycle_start_ms = now_ms;
                    FanState::LongPulse
                } else {
                    FanState::Normal
                }
            }
            FanState::LongPulse => {
                if self.target_pct == 0 {
                    FanState::Off
                } else if self.target_pct >= self.settings.long_pulse_threshold_pct {
                    FanState::Normal
                } else {
                    FanState::LongPulse
                }
            }
        };

        let pct = match self.state {
            FanState::Off => 0,
            FanState::Kickstart => self.settings.kickstart_pct,
            FanState::Normal => self.target_pct.max(self.settings.min_speed_pct),
            FanState::LongPulse => {
                let cycle_ms = self.settings.long_pulse_cycle_ms as u64;
                let phase = (now_ms - self.cycle_start_ms) % cycle_ms;
                let on_ms =
                    cycle_ms * self.target_pct as u64 / self.settings.long_pulse_threshold_pct as u64;
                if phase < on_ms {
                    self.settings.min_speed_pct
                } else {
                    0
                }
            }
        };

        self.effective_pct = pct;
        self.write_duty(percent_to_duty(pct));
    }

    fn write_duty(&mut self, duty: u8) {
        self.duty = duty;
        if self.last_duty != Some(duty) {
            self.pwm.set_duty(duty);
            self.last_duty = Some(duty);
        }
    }
}

/// Map a speed percent to an 8-bit PWM duty
fn percent_to_duty(pct: u8) -> u8 {
    (pct.min(100) as u16 * 255 / 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recording PWM output
    struct MockPwm {
        duty: u8,
        writes: u32,
    }

    impl MockPwm {
        fn new() -> Self {
            Self { duty: 0, writes: 0 }
        }
    }

    impl PwmOutput for &mut MockPwm {
        fn set_duty(&mut self, duty: u8) {
            self.duty = duty;
            self.writes += 1;
        }
    }

    fn make_fan(pwm: &mut MockPwm) -> FanActuator<&mut MockPwm> {
        FanActuator::new(pwm, FanSettings::default())
    }

    #[test]
    fn test_kickstart_on_first_speed() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(30);
        fan.update(0);

        assert!(fan.is_kick_starting());
        assert_eq!(fan.current_percent(), 75);
        assert_eq!(fan.duty(), percent_to_duty(75));
    }

    #[test]
    fn test_kickstart_ends_into_normal() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(30);
        fan.update(0);
        // Still kicking just before the deadline
        fan.update(1_999);
        assert!(fan.is_kick_starting());

        fan.update(2_000);
        assert_eq!(fan.state(), FanState::Normal);
        assert_eq!(fan.current_percent(), 30);
    }

    #[test]
    fn test_kickstart_ends_into_long_pulse() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(5);
        fan.update(0);
        fan.update(2_000);
        assert!(fan.is_long_pulse());
    }

    #[test]
    fn test_min_speed_clamp() {
        // Target above the long-pulse threshold but below min speed:
        // threshold and min are both 10 by default, so raise the floor
        let settings = FanSettings {
            min_speed_pct: 20,
            long_pulse_threshold_pct: 10,
            ..FanSettings::default()
        };
        let mut pwm = MockPwm::new();
        let mut fan = FanActuator::new(&mut pwm, settings);

        fan.set_speed(15);
        fan.update(0);
        fan.update(2_000);

        assert_eq!(fan.state(), FanState::Normal);
        assert_eq!(fan.current_percent(), 20);
    }

    #[test]
    fn test_long_pulse_cycles_between_min_and_off() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        // Target 5 of threshold 10: 50 % on-fraction of the 10 s cycle
        fan.set_speed(5);
        fan.update(0);
        fan.update(2_000); // enters long-pulse, cycle anchored here

        fan.update(2_100);
        assert_eq!(fan.current_percent(), 10); // on-slice at min speed

        fan.update(6_900); // 4 900 ms into the cycle: still on
        assert_eq!(fan.current_percent(), 10);

        fan.update(7_100); // 5 100 ms: off-slice
        assert_eq!(fan.current_percent(), 0);

        // Next cycle starts 10 s after the anchor
        fan.update(12_100);
        assert_eq!(fan.current_percent(), 10);
    }

    #[test]
    fn test_long_pulse_to_normal_and_back() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(5);
        fan.update(0);
        fan.update(2_000);
        assert!(fan.is_long_pulse());

        fan.set_speed(40);
        fan.update(2_100);
        assert_eq!(fan.state(), FanState::Normal);
        assert_eq!(fan.current_percent(), 40);

        fan.set_speed(7);
        fan.update(2_200);
        assert!(fan.is_long_pulse());
    }

    #[test]
    fn test_off_clears_everything_and_rearms_kickstart() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(50);
        fan.update(0);
        fan.update(2_000);
        assert_eq!(fan.state(), FanState::Normal);

        fan.off();
        assert_eq!(fan.state(), FanState::Off);
        assert_eq!(fan.duty(), 0);
        assert!(!fan.is_kick_starting());
        assert!(!fan.is_long_pulse());

        // Next non-zero speed kick-starts again
        fan.set_speed(50);
        fan.update(3_000);
        assert!(fan.is_kick_starting());
    }

    #[test]
    fn test_target_zero_stops_from_any_state() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(50);
        fan.update(0);
        assert!(fan.is_kick_starting());

        fan.set_speed(0);
        fan.update(100);
        assert_eq!(fan.state(), FanState::Off);
        assert_eq!(fan.duty(), 0);
    }

    #[test]
    fn test_manual_override_freezes_until_off() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_manual_duty(200);
        assert!(fan.is_manual());
        assert_eq!(fan.duty(), 200);

        // Automatic control is locked out
        fan.set_speed(50);
        fan.update(1_000);
        assert_eq!(fan.duty(), 200);

        // off() releases the override
        fan.off();
        assert!(!fan.is_manual());
        fan.set_speed(50);
        fan.update(2_000);
        assert!(fan.is_kick_starting());
    }

    #[test]
    fn test_duty_written_only_on_change() {
        let mut pwm = MockPwm::new();
        {
            let mut fan = make_fan(&mut pwm);
            fan.set_speed(50);
            fan.update(0);
            fan.update(10);
            fan.update(20);
        }
        // One kick-start write despite three updates
        assert_eq!(pwm.writes, 1);
    }

    #[test]
    fn test_percent_bounds() {
        let mut pwm = MockPwm::new();
        let mut fan = make_fan(&mut pwm);

        fan.set_speed(255);
        assert_eq!(fan.target_percent(), 100);
        fan.update(0);
        fan.update(2_000);
        assert!(fan.current_percent() <= 100);
        assert_eq!(fan.duty(), 255);
    }
}
