//! Probe sampler
//!
//! Polls the three ADC channels on a shared cadence, classifies each as
//! connected/open/short from the raw counts, and converts connected
//! channels through Steinhart-Hart into the configured unit.

use pyrostat_core::config::{ProbeConfig, SamplerSettings, TempUnit};
use pyrostat_core::probe::{ProbeId, ProbeReading, ProbeStatus};
use pyrostat_core::traits::AdcReader;

use super::steinhart::{celsius_to_unit, resistance_from_adc, SteinhartHart};

/// Per-channel conversion state
#[derive(Debug)]
struct Channel {
    model: SteinhartHart,
    offset: f32,
    last_raw: u16,
    reading: ProbeReading,
}

/// Three-channel thermistor sampler
#[derive(Debug)]
pub struct ProbeSampler<A> {
    adcs: [A; 3],
    channels: [Channel; 3],
    settings: SamplerSettings,
    unit: TempUnit,
    last_sample_ms: Option<u64>,
}

impl<A: AdcReader> ProbeSampler<A> {
    /// Create a sampler from the probe configs, channel order Pit/Meat1/Meat2
    pub fn new(
        adcs: [A; 3],
        probes: &[ProbeConfig; 3],
        settings: SamplerSettings,
        unit: TempUnit,
    ) -> Self {
        let channels = [
            Self::make_channel(&probes[0]),
            Self::make_channel(&probes[1]),
            Self::make_channel(&probes[2]),
        ];
        Self {
            adcs,
            channels,
            settings,
            unit,
            last_sample_ms: None,
        }
    }

    fn make_channel(config: &ProbeConfig) -> Channel {
        Channel {
            model: SteinhartHart::new(config.coeff_a, config.coeff_b, config.coeff_c),
            offset: config.offset,
            last_raw: 0,
            reading: ProbeReading::default(),
        }
    }

    /// Sample all channels if the cadence is due
    pub fn update(&mut self, now_ms: u64) {
        match self.last_sample_ms {
            Some(last) if now_ms < last + self.settings.interval_ms as u64 => return,
            _ => {}
        }
        self.last_sample_ms = Some(now_ms);

        for index in 0..3 {
            // A failed ADC read looks like an unplugged probe
            let raw = self.adcs[index]
                .read()
                .unwrap_or(self.settings.open_threshold);
            let channel = &mut self.channels[index];
            channel.last_raw = raw;
            channel.reading = Self::convert(channel, &self.settings, self.unit, raw);
        }
    }

    fn convert(
        channel: &Channel,
        settings: &SamplerSettings,
        unit: TempUnit,
        raw: u16,
    ) -> ProbeReading {
        if raw >= settings.open_threshold {
            return ProbeReading {
                temperature: 0.0,
                status: ProbeStatus::Open,
            };
        }
        if raw <= settings.short_threshold {
            return ProbeReading {
                temperature: 0.0,
                status: ProbeStatus::Short,
            };
        }

        let resistance = resistance_from_adc(settings.r_ref_ohms, settings.adc_max, raw);
        match channel.model.temperature_c(resistance) {
            Some(temp_c) => ProbeReading {
                temperature: celsius_to_unit(temp_c, unit) + channel.offset,
                status: ProbeStatus::Ok,
            },
            // Non-physical conversion inside the plausible raw range: treat
            // the channel as disconnected rather than report a bogus number
            None => ProbeReading {
                temperature: 0.0,
                status: ProbeStatus::Open,
            },
        }
    }

    /// Latest reading for a probe
    pub fn reading(&self, probe: ProbeId) -> ProbeReading {
        self.channels[probe.index()].reading
    }

    /// Latest readings, channel order Pit/Meat1/Meat2
    pub fn readings(&self) -> [ProbeReading; 3] {
        [
            self.channels[0].reading,
            self.channels[1].reading,
            self.channels[2].reading,
        ]
    }

    /// Latest statuses, channel order Pit/Meat1/Meat2
    pub fn statuses(&self) -> [ProbeStatus; 3] {
        [
            self.channels[0].reading.status,
            self.channels[1].reading.status,
            self.channels[2].reading.status,
        ]
    }

    /// Last raw ADC sample for a probe
    pub fn last_raw(&self, probe: ProbeId) -> u16 {
        self.channels[probe.index()].last_raw
    }
}
