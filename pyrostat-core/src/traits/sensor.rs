//! ADC input abstraction

/// ADC reading trait for platform abstraction
///
/// One instance per probe channel. Readings are raw counts in
/// `0..=adc_max` (12-bit on the reference hardware).
pub trait AdcReader {
    /// Read the current ADC value
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}
