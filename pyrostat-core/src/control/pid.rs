//! PID regulator with lid-open suppression
//!
//! Direct-acting PID on the pit temperature, output 0-100 %. The lid-open
//! detector rides along: a pit well below the setpoint means the lid is up,
//! and blowing air at an open pit only feeds the fire, so the output is
//! forced to 0 and the internal state held until the pit climbs back within
//! the recovery margin of the setpoint.

use crate::config::PidSettings;

/// PID regulator state
#[derive(Debug, Clone)]
pub struct PitPid {
    settings: PidSettings,
    setpoint: f32,
    integral: f32,
    prev_error: f32,
    output: f32,
    enabled: bool,
    lid_open: bool,
    last_update_ms: Option<u64>,
}

impl PitPid {
    /// Create a regulator; starts disabled with setpoint 0
    pub fn new(settings: PidSettings) -> Self {
        Self {
            settings,
            setpoint: 0.0,
            integral: 0.0,
            prev_error: 0.0,
            output: 0.0,
            enabled: false,
            lid_open: false,
            last_update_ms: None,
        }
    }

    /// Current setpoint
    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Update the setpoint
    ///
    /// The lid-open thresholds follow it; the next sample re-evaluates the
    /// detector against the new value.
    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint.max(0.0);
    }

    /// Enable or disable the regulator
    ///
    /// Disabling forces the output to 0 and resets internal state, including
    /// the lid-open flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.output = 0.0;
            self.integral = 0.0;
            self.prev_error = 0.0;
            self.lid_open = false;
            self.last_update_ms = None;
        }
    }

    /// Whether the regulator is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the lid-open detector is currently suppressing the output
    pub fn is_lid_open(&self) -> bool {
        self.lid_open
    }

    /// Last computed output (0-100)
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Run one regulator step
    ///
    /// Gated internally at the configured sample interval; between samples
    /// the previous output is returned unchanged.
    pub fn update(&mut self, now_ms: u64, pit_temp: f32) -> f32 {
        if !self.enabled {
            self.output = 0.0;
            return 0.0;
        }

        let dt = match self.last_update_ms {
            Some(last) if now_ms < last + self.settings.sample_ms as u64 => return self.output,
            Some(last) => (now_ms - last) as f32 / 1000.0,
            None => self.settings.sample_ms as f32 / 1000.0,
        };
        self.last_update_ms = Some(now_ms);

        self.update_lid(pit_temp);
        if self.lid_open {
            // Output suppressed, integral and previous error held
            self.output = 0.0;
            return 0.0;
        }

        let error = self.setpoint - pit_temp;
        let p_term = self.settings.kp * error;
        let d_term = if dt > 0.0 {
            self.settings.kd * (error - self.prev_error) / dt
        } else {
            0.0
        };

        // Conditional integration: the integral only grows while it can
        // still move the output, never while saturated in the wind-up
        // direction.
        let candidate = self.integral + error * dt;
        let unclamped = p_term + self.settings.ki * candidate + d_term;
        let winding_up = (unclamped >= 100.0 && error > 0.0) || (unclamped <= 0.0 && error < 0.0);
        if !winding_up {
            self.integral = candidate;
        }

        self.output = (p_term + self.settings.ki * self.integral + d_term).clamp(0.0, 100.0);
        self.prev_error = error;

        self.output
    }

    fn update_lid(&mut self, pit_temp: f32) {
        if self.setpoint <= 0.0 {
            self.lid_open = false;
            return;
        }

        let drop_at = self.setpoint * (1.0 - self.settings.lid_drop_pct / 100.0);
        let recover_at = self.setpoint * (1.0 - self.settings.lid_recover_pct / 100.0);

        if self.lid_open {
            if pit_temp >= recover_at {
                self.lid_open = false;
            }
        } else if pit_temp < drop_at {
            self.lid_open = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pid() -> PitPid {
        let mut pid = PitPid::new(PidSettings::default());
        pid.set_enabled(true);
        pid.set_setpoint(250.0);
        pid
    }

    #[test]
    fn test_output_bounds() {
        let mut pid = make_pid();

        // First sample just above the drop threshold: P and D stack well
        // past 100 and saturate there, never beyond
        let out = pid.update(0, 235.0);
        assert_eq!(out, 100.0);

        // Way above setpoint pins at 0
        let out = pid.update(1_000, 500.0);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_disabled_outputs_zero() {
        let mut pid = PitPid::new(PidSettings::default());
        pid.set_setpoint(250.0);
        assert_eq!(pid.update(0, 100.0), 0.0);
        assert!(!pid.is_lid_open());
    }

    #[test]
    fn test_sample_gating_returns_previous_output() {
        let mut pid = make_pid();
        let first = pid.update(0, 240.0);
        assert!(first < 100.0);
        // 500 ms later: below the 1000 ms interval, same output
        assert_eq!(pid.update(500, 236.0), first);
        // 1000 ms later: recomputed
        assert_ne!(pid.update(1_000, 236.0), first);
    }

    #[test]
    fn test_pit_below_drop_threshold_is_lid_open() {
        let mut pid = make_pid();
        // 70 is far below 250 * 0.94 = 235: the drop condition holds and
        // the output is suppressed until the pit recovers
        let out = pid.update(0, 70.0);
        assert!(pid.is_lid_open());
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_lid_open_suppresses_output() {
        let mut pid = make_pid();

        // Above the drop threshold: lid closed
        pid.update(0, 248.0);
        assert!(!pid.is_lid_open());

        // Sudden drop below 250 * 0.94 = 235
        let out = pid.update(1_000, 230.0);
        assert!(pid.is_lid_open());
        assert_eq!(out, 0.0);

        // Still below the recovery threshold (245): stays open
        let out = pid.update(2_000, 240.0);
        assert!(pid.is_lid_open());
        assert_eq!(out, 0.0);

        // Recovered
        let out = pid.update(3_000, 246.0);
        assert!(!pid.is_lid_open());
        assert!(out >= 0.0);
    }

    #[test]
    fn test_lid_open_holds_integral() {
        let mut pid = make_pid();

        pid.update(0, 248.0);
        let integral_before = pid.integral;

        // Lid open for three samples
        pid.update(1_000, 230.0);
        pid.update(2_000, 231.0);
        pid.update(3_000, 232.0);
        assert_eq!(pid.integral, integral_before);
    }

    #[test]
    fn test_disable_clears_lid_open() {
        let mut pid = make_pid();
        pid.update(0, 248.0);
        pid.update(1_000, 230.0);
        assert!(pid.is_lid_open());

        pid.set_enabled(false);
        assert!(!pid.is_lid_open());
        assert_eq!(pid.output(), 0.0);
    }

    #[test]
    fn test_setpoint_change_moves_thresholds() {
        let mut pid = make_pid();
        pid.update(0, 248.0);
        assert!(!pid.is_lid_open());

        // Raising the setpoint puts the pit below the new drop threshold
        // (300 * 0.94 = 282) and the detector opens on the next sample
        pid.set_setpoint(300.0);
        let out = pid.update(1_000, 248.0);
        assert!(pid.is_lid_open());
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_integral_accumulates_when_unsaturated() {
        let settings = PidSettings {
            kp: 0.1,
            ki: 0.5,
            kd: 0.0,
            ..PidSettings::default()
        };
        let mut pid = PitPid::new(settings);
        pid.set_enabled(true);
        pid.set_setpoint(250.0);

        pid.update(0, 240.0);
        let first = pid.integral;
        pid.update(1_000, 240.0);
        assert!(pid.integral > first);
    }

    #[test]
    fn test_integral_held_when_saturated() {
        let settings = PidSettings {
            kp: 10.0,
            ki: 0.02,
            kd: 0.0,
            ..PidSettings::default()
        };
        let mut pid = PitPid::new(settings);
        pid.set_enabled(true);
        pid.set_setpoint(250.0);

        // Error of 10 saturates the proportional term alone; the integral
        // must not accumulate while pinned
        pid.update(0, 240.0);
        pid.update(1_000, 240.0);
        pid.update(2_000, 240.0);
        assert_eq!(pid.integral, 0.0);
    }
}
