//! Probe identity and reading types
//!
//! Three single-ended thermistor channels: one clipped to the pit grate, two
//! skewered into the food. Every subsystem refers to them through these
//! types rather than raw channel numbers.

/// Number of meat probes
pub const MEAT_PROBES: usize = 2;

/// Identifies one of the three probe channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbeId {
    Pit,
    Meat1,
    Meat2,
}

impl ProbeId {
    /// All probes in channel order
    pub const ALL: [ProbeId; 3] = [ProbeId::Pit, ProbeId::Meat1, ProbeId::Meat2];

    /// Zero-based channel index
    pub fn index(self) -> usize {
        match self {
            ProbeId::Pit => 0,
            ProbeId::Meat1 => 1,
            ProbeId::Meat2 => 2,
        }
    }
}

/// Connection classification of a probe channel
///
/// An unplugged probe reads at the top of the ADC range through the divider
/// pull-up; a shorted lead reads at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbeStatus {
    /// Probe connected, reading valid
    #[default]
    Ok,
    /// Open circuit (disconnected)
    Open,
    /// Shorted to ground
    Short,
}

impl ProbeStatus {
    /// True when the reading can be trusted
    pub fn is_ok(self) -> bool {
        self == ProbeStatus::Ok
    }
}

/// One probe's latest conditioned sample
///
/// The temperature of a disconnected probe reads 0.0; consumers must branch
/// on the status (or use [`ProbeReading::valid`]), never on the magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeReading {
    /// Conditioned temperature in the configured unit
    pub temperature: f32,
    /// Connection classification
    pub status: ProbeStatus,
}

impl ProbeReading {
    /// The temperature, or `None` when the probe is not Ok
    pub fn valid(&self) -> Option<f32> {
        if self.status.is_ok() {
            Some(self.temperature)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_indices() {
        for (i, probe) in ProbeId::ALL.iter().enumerate() {
            assert_eq!(probe.index(), i);
        }
    }

    #[test]
    fn test_valid_requires_ok_status() {
        let ok = ProbeReading {
            temperature: 225.0,
            status: ProbeStatus::Ok,
        };
        assert_eq!(ok.valid(), Some(225.0));

        let open = ProbeReading {
            temperature: 0.0,
            status: ProbeStatus::Open,
        };
        assert_eq!(open.valid(), None);
    }
}
