//! Alarm state machine
//!
//! Two alarm families share the buzzer: pit deviation (armed only once the
//! pit has reached the setpoint, so the startup climb never alarms) and meat
//! completion. Acknowledging silences the buzzer and latches the currently
//! active kinds so they do not immediately re-fire; a pit alarm re-arms when
//! the pit returns in band, a meat alarm only when its target is
//! re-assigned.
//!
//! The `pit_reached` arming latch is an input here: the orchestrator owns it
//! (it knows when the setpoint changes and when the pit first touches it).

use heapless::Vec;

use crate::config::AlarmSettings;

/// Maximum simultaneously active alarm kinds
pub const MAX_ALARMS: usize = 4;

/// Alarm kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmKind {
    /// Pit above setpoint + band
    PitHigh,
    /// Pit below setpoint - band
    PitLow,
    /// Meat probe 1 reached its target
    Meat1Done,
    /// Meat probe 2 reached its target
    Meat2Done,
}

/// Alarm monitor
#[derive(Debug)]
pub struct AlarmMonitor {
    settings: AlarmSettings,
    pit_band: f32,
    meat_targets: [f32; 2],
    pit_triggered: bool,
    meat_triggered: [bool; 2],
    active: Vec<AlarmKind, MAX_ALARMS>,
    enabled: bool,
    buzzer_on: bool,
    last_toggle_ms: u64,
}

impl AlarmMonitor {
    /// Create a monitor with no targets set
    pub fn new(settings: AlarmSettings) -> Self {
        let pit_band = settings.pit_band;
        Self {
            settings,
            pit_band,
            meat_targets: [0.0, 0.0],
            pit_triggered: false,
            meat_triggered: [false, false],
            active: Vec::new(),
            enabled: true,
            buzzer_on: false,
            last_toggle_ms: 0,
        }
    }

    /// Currently active alarm kinds, in firing order
    pub fn active(&self) -> &[AlarmKind] {
        &self.active
    }

    /// Whether any alarm is currently firing
    pub fn is_alarming(&self) -> bool {
        !self.active.is_empty()
    }

    /// Whether the buzzer should currently be sounding
    pub fn buzzer_on(&self) -> bool {
        self.buzzer_on
    }

    /// Current pit deviation band
    pub fn pit_band(&self) -> f32 {
        self.pit_band
    }

    /// Set the pit deviation band; callers reject non-positive values
    pub fn set_pit_band(&mut self, band: f32) {
        self.pit_band = band;
    }

    /// Meat target for the given probe index (0 or 1)
    pub fn meat_target(&self, index: usize) -> f32 {
        self.meat_targets[index]
    }

    /// Assign a meat completion target; 0 clears it
    ///
    /// Re-arms the probe's alarm either way.
    pub fn set_meat_target(&mut self, index: usize, target: f32) {
        self.meat_targets[index] = target.max(0.0);
        self.meat_triggered[index] = false;
        self.remove(Self::meat_kind(index));
    }

    /// Enable or disable alarm evaluation
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.buzzer_on = false;
        }
    }

    /// Whether alarm evaluation is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Silence the buzzer and latch the active alarms against re-fire
    pub fn acknowledge(&mut self) {
        for kind in self.active.iter() {
            match kind {
                AlarmKind::PitHigh | AlarmKind::PitLow => self.pit_triggered = true,
                AlarmKind::Meat1Done => self.meat_triggered[0] = true,
                AlarmKind::Meat2Done => self.meat_triggered[1] = true,
            }
        }
        self.active.clear();
        self.buzzer_on = false;
        self.last_toggle_ms = 0;
    }

    /// Evaluate alarms for one tick
    ///
    /// Disconnected probes arrive as `None` and are skipped. `pit_reached`
    /// arms the deviation alarm; the orchestrator latches it when the pit
    /// first touches the setpoint and clears it when the setpoint changes.
    pub fn update(
        &mut self,
        now_ms: u64,
        pit_temp: Option<f32>,
        meat_temps: [Option<f32>; 2],
        setpoint: f32,
        pit_reached: bool,
    ) {
        if !self.enabled {
            self.buzzer_on = false;
            return;
        }

        if let Some(pit) = pit_temp {
            if pit_reached {
                self.evaluate_pit(pit, setpoint);
            }
        }
        for index in 0..2 {
            if let Some(temp) = meat_temps[index] {
                self.evaluate_meat(index, temp);
            }
        }

        self.drive_buzzer(now_ms);
    }

    fn evaluate_pit(&mut self, pit: f32, setpoint: f32) {
        if setpoint <= 0.0 {
            return;
        }

        if pit > setpoint + self.pit_band {
            self.remove(AlarmKind::PitLow);
            if !self.pit_triggered {
                self.insert(AlarmKind::PitHigh);
            }
        } else if pit < setpoint - self.pit_band {
            self.remove(AlarmKind::PitHigh);
            if !self.pit_triggered {
                self.insert(AlarmKind::PitLow);
            }
        } else {
            self.remove(AlarmKind::PitHigh);
            self.remove(AlarmKind::PitLow);
            self.pit_triggered = false;
        }
    }

    fn evaluate_meat(&mut self, index: usize, temp: f32) {
        let target = self.meat_targets[index];
        if target <= 0.0 || temp <= 0.0 {
            return;
        }

        if temp >= target && !self.meat_triggered[index] {
            self.insert(Self::meat_kind(index));
            self.meat_triggered[index] = true;
        }
    }

    fn drive_buzzer(&mut self, now_ms: u64) {
        if self.active.is_empty() {
            self.buzzer_on = false;
            return;
        }

        if !self.buzzer_on && self.last_toggle_ms == 0 {
            // First tick of a fresh alarm: start sounding immediately
            self.buzzer_on = true;
            self.last_toggle_ms = now_ms;
            return;
        }

        let phase_ms = if self.buzzer_on {
            self.settings.buzzer_on_ms
        } else {
            self.settings.buzzer_off_ms
        };
        if now_ms >= self.last_toggle_ms + phase_ms as u64 {
            self.buzzer_on = !self.buzzer_on;
            self.last_toggle_ms = now_ms;
        }
    }

    fn meat_kind(index: usize) -> AlarmKind {
        if index == 0 {
            AlarmKind::Meat1Done
        } else {
            AlarmKind::Meat2Done
        }
    }

    fn insert(&mut self, kind: AlarmKind) {
        if !self.active.contains(&kind) {
            let _ = self.active.push(kind);
        }
    }

    fn remove(&mut self, kind: AlarmKind) {
        self.active.retain(|k| *k != kind);
        if self.active.is_empty() {
            self.last_toggle_ms = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_monitor() -> AlarmMonitor {
        let mut monitor = AlarmMonitor::new(AlarmSettings::default());
        monitor.set_pit_band(15.0);
        monitor
    }

    #[test]
    fn test_pit_deviation_unarmed_before_reaching_setpoint() {
        let mut monitor = make_monitor();

        // Overshooting pit with the arming latch still clear: no alarm
        monitor.update(0, Some(300.0), [None, None], 250.0, false);
        assert!(!monitor.is_alarming());
    }

    #[test]
    fn test_pit_deviation_fires_once_armed() {
        let mut monitor = make_monitor();

        monitor.update(0, Some(300.0), [None, None], 250.0, true);
        assert_eq!(monitor.active(), &[AlarmKind::PitHigh]);

        // Back in band clears it
        monitor.update(1_000, Some(255.0), [None, None], 250.0, true);
        assert!(!monitor.is_alarming());
    }

    #[test]
    fn test_pit_high_low_never_simultaneous() {
        let mut monitor = make_monitor();

        monitor.update(0, Some(300.0), [None, None], 250.0, true);
        assert_eq!(monitor.active(), &[AlarmKind::PitHigh]);

        // Swing straight to the other side without passing a tick in band
        monitor.update(1_000, Some(200.0), [None, None], 250.0, true);
        assert_eq!(monitor.active(), &[AlarmKind::PitLow]);
    }

    #[test]
    fn test_band_edges_are_strict() {
        let mut monitor = make_monitor();

        // Exactly at setpoint + band: strict inequality, no alarm
        monitor.update(0, Some(265.0), [None, None], 250.0, true);
        assert!(!monitor.is_alarming());
        monitor.update(1_000, Some(235.0), [None, None], 250.0, true);
        assert!(!monitor.is_alarming());
    }

    #[test]
    fn test_pit_acknowledge_requires_return_in_band() {
        let mut monitor = make_monitor();
        monitor.update(0, Some(300.0), [None, None], 250.0, true);
        assert!(monitor.is_alarming());

        monitor.acknowledge();
        assert!(!monitor.is_alarming());
        assert!(!monitor.buzzer_on());

        // Still out of band: latched, no re-fire
        monitor.update(1_000, Some(301.0), [None, None], 250.0, true);
        assert!(!monitor.is_alarming());

        // In band clears the latch; the next deviation fires again
        monitor.update(2_000, Some(255.0), [None, None], 250.0, true);
        monitor.update(3_000, Some(300.0), [None, None], 250.0, true);
        assert_eq!(monitor.active(), &[AlarmKind::PitHigh]);
    }

    #[test]
    fn test_meat_completion_hysteresis() {
        let mut monitor = make_monitor();
        monitor.set_meat_target(0, 200.0);

        monitor.update(0, None, [Some(200.0), None], 0.0, false);
        assert_eq!(monitor.active(), &[AlarmKind::Meat1Done]);

        monitor.acknowledge();

        // Hotter still: latched, no re-fire
        monitor.update(1_000, None, [Some(205.0), None], 0.0, false);
        assert!(!monitor.is_alarming());

        // A new target re-arms
        monitor.set_meat_target(0, 210.0);
        monitor.update(2_000, None, [Some(210.0), None], 0.0, false);
        assert_eq!(monitor.active(), &[AlarmKind::Meat1Done]);
    }

    #[test]
    fn test_meat_cleared_target_never_fires() {
        let mut monitor = make_monitor();
        monitor.set_meat_target(1, 160.0);
        monitor.update(0, None, [None, Some(165.0)], 0.0, false);
        assert!(monitor.is_alarming());

        monitor.set_meat_target(1, 0.0);
        assert!(!monitor.is_alarming());
        monitor.update(1_000, None, [None, Some(170.0)], 0.0, false);
        assert!(!monitor.is_alarming());
    }

    #[test]
    fn test_disconnected_probe_is_skipped() {
        let mut monitor = make_monitor();
        monitor.set_meat_target(0, 200.0);

        // Probe invalid: a raw 0.0 reading must not be evaluated
        monitor.update(0, None, [None, None], 250.0, true);
        assert!(!monitor.is_alarming());
    }

    #[test]
    fn test_buzzer_cadence() {
        let mut monitor = make_monitor();
        monitor.update(1_000, Some(300.0), [None, None], 250.0, true);
        assert!(monitor.buzzer_on());

        // Default cadence is 500 ms on / 500 ms off
        monitor.update(1_400, Some(300.0), [None, None], 250.0, true);
        assert!(monitor.buzzer_on());
        monitor.update(1_500, Some(300.0), [None, None], 250.0, true);
        assert!(!monitor.buzzer_on());
        monitor.update(2_000, Some(300.0), [None, None], 250.0, true);
        assert!(monitor.buzzer_on());
    }

    #[test]
    fn test_disabled_bypasses_evaluation() {
        let mut monitor = make_monitor();
        monitor.set_enabled(false);
        monitor.update(0, Some(300.0), [None, None], 250.0, true);
        assert!(!monitor.is_alarming());
        assert!(!monitor.buzzer_on());
    }
}
