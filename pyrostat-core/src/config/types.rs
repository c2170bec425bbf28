//! Configuration type definitions

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum probe name length
pub const MAX_PROBE_NAME_LEN: usize = 16;

/// Temperature unit selection
///
/// The conversion path applies the unit once, at the probe sampler; every
/// downstream value (setpoint, bands, targets, rates, the session log) is in
/// the selected unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TempUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

/// Per-probe thermistor configuration
///
/// The Steinhart-Hart coefficients calibrate a single probe model; the
/// offset trims residual error (ice-bath / boil test) additively.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbeConfig {
    /// Display name ("Pit", "Brisket", ...)
    pub name: String<MAX_PROBE_NAME_LEN>,
    /// Steinhart-Hart coefficient A
    pub coeff_a: f32,
    /// Steinhart-Hart coefficient B
    pub coeff_b: f32,
    /// Steinhart-Hart coefficient C
    pub coeff_c: f32,
    /// Additive calibration offset in the configured unit
    pub offset: f32,
}

impl ProbeConfig {
    /// Config for a Maverick ET-72/73 style probe with the given name
    pub fn maverick(name: &str) -> Self {
        let mut n = String::new();
        let _ = n.push_str(name);
        Self {
            name: n,
            coeff_a: 2.306_743_4e-4,
            coeff_b: 2.369_659_6e-4,
            coeff_c: 1.263_641_4e-7,
            offset: 0.0,
        }
    }
}

/// Shared probe sampling configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplerSettings {
    /// Sampling interval in milliseconds
    pub interval_ms: u32,
    /// Divider reference resistance in ohms
    pub r_ref_ohms: f32,
    /// Full-scale ADC count (4095 for 12-bit)
    pub adc_max: u16,
    /// Raw counts at or above this classify as open circuit
    pub open_threshold: u16,
    /// Raw counts at or below this classify as short circuit
    pub short_threshold: u16,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            r_ref_ohms: 10_000.0,
            adc_max: 4_095,
            open_threshold: 4_090,
            short_threshold: 10,
        }
    }
}

/// PID regulator and lid-open detector configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidSettings {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Regulator sample interval in milliseconds
    pub sample_ms: u32,
    /// Lid-open trigger: pit below setpoint by this percent of setpoint
    pub lid_drop_pct: f32,
    /// Lid-open recovery: pit back within this percent of setpoint
    pub lid_recover_pct: f32,
}

impl Default for PidSettings {
    fn default() -> Self {
        Self {
            kp: 4.0,
            ki: 0.02,
            kd: 5.0,
            sample_ms: 1_000,
            lid_drop_pct: 6.0,
            lid_recover_pct: 2.0,
        }
    }
}

/// Blower fan configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FanSettings {
    /// Split-range threshold: regulator output percent at which the fan
    /// starts assisting the damper
    pub on_threshold: f32,
    /// Minimum sustainable fan speed percent
    pub min_speed_pct: u8,
    /// Kick-start pulse strength percent
    pub kickstart_pct: u8,
    /// Kick-start pulse duration in milliseconds
    pub kickstart_ms: u32,
    /// Below this target percent the fan cycles instead of running
    pub long_pulse_threshold_pct: u8,
    /// Long-pulse cycle period in milliseconds
    pub long_pulse_cycle_ms: u32,
}

impl Default for FanSettings {
    fn default() -> Self {
        Self {
            on_threshold: 50.0,
            min_speed_pct: 10,
            kickstart_pct: 75,
            kickstart_ms: 2_000,
            long_pulse_threshold_pct: 10,
            long_pulse_cycle_ms: 10_000,
        }
    }
}

/// Butterfly damper servo configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DamperSettings {
    /// Servo angle at 0 % (damper closed), degrees
    pub closed_angle: f32,
    /// Servo angle at 100 % (damper open), degrees
    pub open_angle: f32,
    /// Pulse width at 0 degrees, microseconds
    pub min_pulse_us: u16,
    /// Pulse width at 180 degrees, microseconds
    pub max_pulse_us: u16,
}

impl Default for DamperSettings {
    fn default() -> Self {
        Self {
            closed_angle: 0.0,
            open_angle: 90.0,
            min_pulse_us: 500,
            max_pulse_us: 2_500,
        }
    }
}

/// Alarm configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlarmSettings {
    /// Symmetric pit deviation band in degrees
    pub pit_band: f32,
    /// Buzzer tone frequency in Hz
    pub buzzer_freq_hz: u16,
    /// Buzzer cadence on time in milliseconds
    pub buzzer_on_ms: u32,
    /// Buzzer cadence off time in milliseconds
    pub buzzer_off_ms: u32,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            pit_band: 10.0,
            buzzer_freq_hz: 2_000,
            buzzer_on_ms: 500,
            buzzer_off_ms: 500,
        }
    }
}

/// Fire-out detector configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FireOutSettings {
    /// Decline rate in degrees per minute that counts as losing the fire
    pub rate_per_min: f32,
    /// How long the decline must persist before the error is raised, ms
    pub duration_ms: u64,
}

impl Default for FireOutSettings {
    fn default() -> Self {
        Self {
            rate_per_min: 5.0,
            duration_ms: 600_000, // 10 minutes
        }
    }
}

/// Cook-session recorder configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionSettings {
    /// Sampling interval in milliseconds
    pub sample_interval_ms: u32,
    /// Flush-to-storage interval in milliseconds
    pub flush_interval_ms: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 5_000,
            flush_interval_ms: 60_000,
        }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Temperature unit for every value in the system
    pub unit: TempUnit,
    /// Per-probe thermistor models, channel order Pit/Meat1/Meat2
    pub probes: [ProbeConfig; 3],
    /// Probe sampling
    pub sampler: SamplerSettings,
    /// Regulator
    pub pid: PidSettings,
    /// Blower fan
    pub fan: FanSettings,
    /// Damper servo
    pub damper: DamperSettings,
    /// Alarms
    pub alarm: AlarmSettings,
    /// Fire-out detection
    pub fire_out: FireOutSettings,
    /// Cook-session recorder
    pub session: SessionSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            unit: TempUnit::Fahrenheit,
            probes: [
                ProbeConfig::maverick("Pit"),
                ProbeConfig::maverick("Meat 1"),
                ProbeConfig::maverick("Meat 2"),
            ],
            sampler: SamplerSettings::default(),
            pid: PidSettings::default(),
            fan: FanSettings::default(),
            damper: DamperSettings::default(),
            alarm: AlarmSettings::default(),
            fire_out: FireOutSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

#[cfg(feature = "serde")]
impl ControllerConfig {
    /// Serialize into a caller-provided buffer as postcard binary data
    pub fn to_postcard<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize from postcard binary data
    pub fn from_postcard(buf: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(buf)
    }
}
