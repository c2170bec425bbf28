//! Buzzer driver
//!
//! The alarm monitor decides when the buzzer should sound; this driver
//! turns that decision into tone transitions, touching the output only on
//! edges.

use pyrostat_core::traits::Buzzer;

/// Edge-triggered buzzer driver
#[derive(Debug)]
pub struct BuzzerDriver<B> {
    out: B,
    freq_hz: u16,
    sounding: bool,
}

impl<B: Buzzer> BuzzerDriver<B> {
    /// Create a silent driver with the configured tone frequency
    pub fn new(out: B, freq_hz: u16) -> Self {
        Self {
            out,
            freq_hz,
            sounding: false,
        }
    }

    /// Whether the buzzer is currently sounding
    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    /// Apply the desired buzzer state
    pub fn set(&mut self, on: bool) {
        if on == self.sounding {
            return;
        }
        if on {
            self.out.tone_on(self.freq_hz);
        } else {
            self.out.tone_off();
        }
        self.sounding = on;
    }
}
