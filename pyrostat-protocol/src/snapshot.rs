//! State snapshot published to subscribers
//!
//! The control core assembles one of these per publish interval; the network
//! and UI collaborators render it without reaching into the core.

use heapless::{String, Vec};

/// Maximum active error messages carried in a snapshot
///
/// Matches the error detector's active-list capacity.
pub const MAX_SNAPSHOT_ERRORS: usize = 8;

/// Maximum length of a single error message
pub const ERROR_MSG_LEN: usize = 48;

/// A point-in-time view of the whole controller
///
/// Temperatures are `None` when the probe is disconnected; ETA epochs are
/// `None` when no prediction is available for that probe.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSnapshot {
    /// Monotonic time of the snapshot (ms)
    pub monotonic_ms: u64,
    /// Wall-clock time of the snapshot, if synchronized
    pub epoch_seconds: Option<u32>,
    /// Pit temperature
    pub pit_temp: Option<f32>,
    /// Meat probe 1 temperature
    pub meat1_temp: Option<f32>,
    /// Meat probe 2 temperature
    pub meat2_temp: Option<f32>,
    /// Regulator setpoint
    pub setpoint: f32,
    /// Fan output percent
    pub fan_pct: u8,
    /// Damper position percent
    pub damper_pct: u8,
    /// Lid-open detector currently suppressing the regulator
    pub lid_open: bool,
    /// Predicted completion time for meat probe 1 (epoch seconds)
    pub meat1_eta_epoch: Option<u32>,
    /// Predicted completion time for meat probe 2 (epoch seconds)
    pub meat2_eta_epoch: Option<u32>,
    /// Active error messages, oldest first
    pub errors: Vec<String<ERROR_MSG_LEN>, MAX_SNAPSHOT_ERRORS>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_empty() {
        let snap = StateSnapshot::default();
        assert_eq!(snap.pit_temp, None);
        assert_eq!(snap.meat1_eta_epoch, None);
        assert!(snap.errors.is_empty());
        assert!(!snap.lid_open);
    }
}
