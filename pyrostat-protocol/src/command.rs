//! Commands accepted by the control core
//!
//! External collaborators (touchscreen, network server) never mutate core
//! state directly; they submit one of these and the core applies it at the
//! top of its next tick.

/// Selects one of the two meat probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeatProbe {
    Meat1,
    Meat2,
}

impl MeatProbe {
    /// Zero-based index into meat-probe arrays
    pub fn index(self) -> usize {
        match self {
            MeatProbe::Meat1 => 0,
            MeatProbe::Meat2 => 1,
        }
    }
}

/// A command submitted to the control core
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Update the regulator's pit setpoint
    SetSetpoint(f32),
    /// Set a meat-probe completion target; 0 clears it and re-arms the alarm
    SetMeatTarget { probe: MeatProbe, target: f32 },
    /// Set the pit deviation alarm band; values <= 0 are rejected
    SetPitBand(f32),
    /// Silence active alarms and latch them against immediate re-fire
    AcknowledgeAlarms,
    /// Start a fresh cook session, discarding any previous log
    StartSession,
    /// Flush and close the current cook session
    EndSession,
    /// Discard the cook session entirely (RAM and disk)
    ClearSession,
    /// Enable or disable alarm evaluation
    SetAlarmEnabled(bool),
    /// Enable or disable the PID regulator
    SetPidEnabled(bool),
    /// Report the network link state
    SetLinkConnected(bool),
    /// Freeze the fan at a fixed PWM duty (manual override)
    SetManualFan(u8),
    /// Leave manual fan override and return to automatic control
    ResumeFanAuto,
}
