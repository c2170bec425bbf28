//! Error detection
//!
//! Maintains the ordered list of active runtime errors: probe open/short,
//! fire-out, and network link loss. Nothing here stops the control loop;
//! errors are surfaced for the operator to act on.
//!
//! Fire-out is the one with state: a pit that keeps falling hard while the
//! fan is already flat out means there is nothing left to burn. Sampled on a
//! one-minute cadence so ordinary turbulence never counts.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::config::{FireOutSettings, MAX_PROBE_NAME_LEN};
use crate::probe::{ProbeId, ProbeStatus};

/// Maximum simultaneously active errors
pub const MAX_ERRORS: usize = 8;

/// Maximum length of an error message
pub const MAX_MESSAGE_LEN: usize = 48;

/// Pit-history slots kept by the fire-out detector
const FIRE_OUT_HISTORY: usize = 10;

/// Fire-out sampling cadence (one simulated minute)
const FIRE_OUT_SAMPLE_MS: u64 = 60_000;

/// Fan saturation floor for the fire-out heuristic, percent
const FIRE_OUT_FAN_FLOOR: u8 = 95;

/// Error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Probe open circuit (disconnected)
    ProbeOpen,
    /// Probe shorted
    ProbeShort,
    /// Sustained pit decline at saturated fan
    FireOut,
    /// Network link down
    LinkLost,
}

/// One active error entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Which probe, for probe errors
    pub probe: Option<ProbeId>,
    /// Operator-facing message
    pub message: String<MAX_MESSAGE_LEN>,
}

/// Fire-out detector
///
/// Keeps a minute-cadence history of pit temperatures and watches for a
/// sustained decline that the saturated fan cannot arrest.
#[derive(Debug)]
struct FireOutDetector {
    settings: FireOutSettings,
    history: [f32; FIRE_OUT_HISTORY],
    head: usize,
    count: usize,
    last_sample_ms: Option<u64>,
    declining: bool,
    decline_start_ms: u64,
    active: bool,
}

impl FireOutDetector {
    fn new(settings: FireOutSettings) -> Self {
        Self {
            settings,
            history: [0.0; FIRE_OUT_HISTORY],
            head: 0,
            count: 0,
            last_sample_ms: None,
            declining: false,
            decline_start_ms: 0,
            active: false,
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, now_ms: u64, pit_temp: f32, fan_pct: u8) {
        match self.last_sample_ms {
            Some(last) if now_ms < last + FIRE_OUT_SAMPLE_MS => return,
            _ => {}
        }
        self.last_sample_ms = Some(now_ms);

        let prev = if self.count > 0 {
            Some(self.history[(self.head + FIRE_OUT_HISTORY - 1) % FIRE_OUT_HISTORY])
        } else {
            None
        };

        self.history[self.head] = pit_temp;
        self.head = (self.head + 1) % FIRE_OUT_HISTORY;
        if self.count < FIRE_OUT_HISTORY {
            self.count += 1;
        }

        let rate_per_min = match prev {
            Some(p) if p > 0.0 => p - pit_temp,
            _ => 0.0,
        };

        if rate_per_min >= self.settings.rate_per_min && fan_pct >= FIRE_OUT_FAN_FLOOR {
            if !self.declining {
                self.declining = true;
                self.decline_start_ms = now_ms;
            }
            if now_ms - self.decline_start_ms >= self.settings.duration_ms {
                self.active = true;
            }
        } else {
            self.declining = false;
            self.active = false;
        }
    }
}

/// Error monitor
#[derive(Debug)]
pub struct ErrorMonitor {
    active: Vec<ActiveError, MAX_ERRORS>,
    probe_names: [String<MAX_PROBE_NAME_LEN>; 3],
    fire_out: FireOutDetector,
    link_connected: bool,
}

impl ErrorMonitor {
    /// Create a monitor; probe names feed the operator messages
    pub fn new(probe_names: [String<MAX_PROBE_NAME_LEN>; 3], fire_out: FireOutSettings) -> Self {
        Self {
            active: Vec::new(),
            probe_names,
            fire_out: FireOutDetector::new(fire_out),
            link_connected: true,
        }
    }

    /// Currently active errors, oldest first
    pub fn active(&self) -> &[ActiveError] {
        &self.active
    }

    /// Whether an error of the given kind/probe is active
    pub fn has(&self, kind: ErrorKind, probe: Option<ProbeId>) -> bool {
        self.active
            .iter()
            .any(|e| e.kind == kind && e.probe == probe)
    }

    /// Whether the fire-out condition is currently raised
    pub fn fire_out_active(&self) -> bool {
        self.fire_out.is_active()
    }

    /// Report the network link state
    pub fn set_link_connected(&mut self, connected: bool) {
        self.link_connected = connected;
    }

    /// Evaluate errors for one tick
    ///
    /// `pit_temp` is `None` while the pit probe is invalid; fire-out
    /// detection holds its state until a valid reading returns.
    pub fn update(
        &mut self,
        now_ms: u64,
        statuses: [ProbeStatus; 3],
        pit_temp: Option<f32>,
        fan_pct: u8,
    ) {
        for probe in ProbeId::ALL {
            let status = statuses[probe.index()];
            match status {
                ProbeStatus::Open => {
                    self.insert_probe(ErrorKind::ProbeOpen, probe, "disconnected");
                    self.remove(ErrorKind::ProbeShort, Some(probe));
                }
                ProbeStatus::Short => {
                    self.insert_probe(ErrorKind::ProbeShort, probe, "shorted");
                    self.remove(ErrorKind::ProbeOpen, Some(probe));
                }
                ProbeStatus::Ok => {
                    self.remove(ErrorKind::ProbeOpen, Some(probe));
                    self.remove(ErrorKind::ProbeShort, Some(probe));
                }
            }
        }

        if let Some(pit) = pit_temp {
            self.fire_out.update(now_ms, pit, fan_pct);
        }
        if self.fire_out.is_active() {
            self.insert(ErrorKind::FireOut, None, "Fire out: pit falling at full fan");
        } else {
            self.remove(ErrorKind::FireOut, None);
        }

        if self.link_connected {
            self.remove(ErrorKind::LinkLost, None);
        } else {
            self.insert(ErrorKind::LinkLost, None, "Network link lost");
        }
    }

    fn insert_probe(&mut self, kind: ErrorKind, probe: ProbeId, what: &str) {
        if self.has(kind, Some(probe)) {
            return;
        }
        let mut message = String::new();
        let _ = write!(
            message,
            "{} probe {}",
            self.probe_names[probe.index()],
            what
        );
        let _ = self.active.push(ActiveError {
            kind,
            probe: Some(probe),
            message,
        });
    }

    fn insert(&mut self, kind: ErrorKind, probe: Option<ProbeId>, text: &str) {
        if self.has(kind, probe) {
            return;
        }
        let mut message = String::new();
        let _ = message.push_str(text);
        let _ = self.active.push(ActiveError {
            kind,
            probe,
            message,
        });
    }

    fn remove(&mut self, kind: ErrorKind, probe: Option<ProbeId>) {
        self.active.retain(|e| !(e.kind == kind && e.probe == probe));
    }
}
