//! Steinhart-Hart thermistor model
//!
//! BBQ probes are NTC thermistors read through a voltage divider. The
//! Steinhart-Hart equation turns the divider resistance into a temperature:
//!
//! ```text
//! 1/T = A + B ln(R) + C (ln R)^3
//! ```
//!
//! with T in Kelvin and the three coefficients calibrating one probe model.

use libm::logf;

use pyrostat_core::config::TempUnit;

/// A probe's Steinhart-Hart coefficients
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SteinhartHart {
    /// Coefficient A
    pub a: f32,
    /// Coefficient B
    pub b: f32,
    /// Coefficient C
    pub c: f32,
}

impl SteinhartHart {
    /// Create a model from its coefficients
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    /// Temperature in Celsius for a thermistor resistance
    ///
    /// `None` when the resistance is non-positive or the model evaluates to
    /// a non-physical temperature; callers must not treat 0 as a reading.
    pub fn temperature_c(&self, resistance_ohms: f32) -> Option<f32> {
        if resistance_ohms <= 0.0 {
            return None;
        }

        let ln_r = logf(resistance_ohms);
        let inv_t = self.a + self.b * ln_r + self.c * ln_r * ln_r * ln_r;
        if inv_t <= 0.0 {
            return None;
        }

        Some(1.0 / inv_t - 273.15)
    }
}

/// Divider resistance for a raw ADC reading
///
/// `R = Rref * (adc_max / raw - 1)`. A raw reading of 0 maps to 0 ohms.
/// Raw values near either rail never reach this: the sampler classifies
/// them as open or short first.
pub fn resistance_from_adc(r_ref_ohms: f32, adc_max: u16, raw: u16) -> f32 {
    if raw == 0 {
        return 0.0;
    }
    let raw = raw.min(adc_max);
    r_ref_ohms * (adc_max as f32 / raw as f32 - 1.0)
}

/// Convert a Celsius temperature to the configured unit
pub fn celsius_to_unit(temp_c: f32, unit: TempUnit) -> f32 {
    match unit {
        TempUnit::Celsius => temp_c,
        TempUnit::Fahrenheit => temp_c * 1.8 + 32.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maverick ET-72/73 coefficients, the config default
    fn maverick() -> SteinhartHart {
        SteinhartHart::new(2.306_743_4e-4, 2.369_659_6e-4, 1.263_641_4e-7)
    }

    #[test]
    fn test_room_temperature() {
        // A Maverick probe reads about 200 kOhm at room temperature
        let temp = maverick().temperature_c(200_000.0).unwrap();
        assert!((temp - 25.1).abs() < 0.5, "got {temp}");
    }

    #[test]
    fn test_cook_range() {
        // ~10 kOhm lands in the smoking range
        let temp = maverick().temperature_c(10_000.0).unwrap();
        assert!((temp - 125.0).abs() < 1.0, "got {temp}");
    }

    #[test]
    fn test_monotonic_decreasing_resistance() {
        let model = maverick();
        let cold = model.temperature_c(500_000.0).unwrap();
        let warm = model.temperature_c(50_000.0).unwrap();
        let hot = model.temperature_c(5_000.0).unwrap();
        assert!(cold < warm && warm < hot);
    }

    #[test]
    fn test_invalid_resistance() {
        assert_eq!(maverick().temperature_c(0.0), None);
        assert_eq!(maverick().temperature_c(-100.0), None);
    }

    #[test]
    fn test_resistance_from_adc() {
        // Mid-scale reading equals the reference resistance
        let r = resistance_from_adc(10_000.0, 4_095, 2_048);
        assert!((r - 9_995.0).abs() < 20.0, "got {r}");

        // Zero raw is defined as zero ohms
        assert_eq!(resistance_from_adc(10_000.0, 4_095, 0), 0.0);

        // Full scale is zero ohms through the divider
        assert_eq!(resistance_from_adc(10_000.0, 4_095, 4_095), 0.0);

        // Above full scale clamps rather than going negative
        assert_eq!(resistance_from_adc(10_000.0, 4_095, 5_000), 0.0);
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(celsius_to_unit(100.0, TempUnit::Celsius), 100.0);
        assert_eq!(celsius_to_unit(100.0, TempUnit::Fahrenheit), 212.0);
        assert_eq!(celsius_to_unit(0.0, TempUnit::Fahrenheit), 32.0);
    }
}
