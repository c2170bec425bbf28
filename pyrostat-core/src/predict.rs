//! Meat-completion predictor
//!
//! One trend window per meat probe: a ring of (epoch, temperature) samples
//! at a 5 s cadence. Completion time comes from an ordinary least-squares
//! line through the window. Meat temperature is slow and monotonic enough
//! over five minutes that a line is an honest estimate everywhere except the
//! stall, where every estimator lies.

use crate::probe::MEAT_PROBES;

/// Slots per trend window (5 minutes at the 5 s cadence)
pub const WINDOW_SLOTS: usize = 60;

/// Minimum samples before a slope is computed
pub const MIN_SAMPLES: usize = 12;

/// Sampling cadence in milliseconds
pub const SAMPLE_INTERVAL_MS: u64 = 5_000;

/// Predictions further out than this are noise, not information (seconds)
pub const MAX_LOOKAHEAD_S: u32 = 86_400;

/// One recorded trend sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrendSample {
    /// Wall-clock epoch seconds
    pub epoch: u32,
    /// Temperature in the configured unit
    pub temperature: f32,
}

/// A completed prediction for one probe
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Prediction {
    /// Current heating rate, degrees per minute
    pub rate_per_min: f32,
    /// Seconds until the target is reached
    pub seconds_remaining: u32,
    /// Predicted completion time, epoch seconds
    pub eta_epoch: u32,
}

/// Fixed-capacity trend window for one probe
#[derive(Debug)]
pub struct TrendWindow {
    samples: [TrendSample; WINDOW_SLOTS],
    head: usize,
    count: usize,
    target: f32,
}

impl TrendWindow {
    /// Create an empty window with no target
    pub fn new() -> Self {
        Self {
            samples: [TrendSample::default(); WINDOW_SLOTS],
            head: 0,
            count: 0,
            target: 0.0,
        }
    }

    /// Number of samples currently held
    pub fn count(&self) -> usize {
        self.count
    }

    /// Completion target; 0 means unset
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Assign the completion target; 0 clears it
    pub fn set_target(&mut self, target: f32) {
        self.target = target.max(0.0);
    }

    /// Discard all samples, preserving the target
    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
    }

    /// Record one sample
    pub fn record(&mut self, epoch: u32, temperature: f32) {
        self.samples[self.head] = TrendSample { epoch, temperature };
        self.head = (self.head + 1) % WINDOW_SLOTS;
        if self.count < WINDOW_SLOTS {
            self.count += 1;
        }
    }

    /// The i-th oldest sample, for 0 <= i < count
    pub fn sample(&self, index: usize) -> Option<TrendSample> {
        if index >= self.count {
            return None;
        }
        let oldest = (self.head + WINDOW_SLOTS - self.count) % WINDOW_SLOTS;
        Some(self.samples[(oldest + index) % WINDOW_SLOTS])
    }

    /// The most recent sample
    pub fn latest(&self) -> Option<TrendSample> {
        if self.count == 0 {
            None
        } else {
            self.sample(self.count - 1)
        }
    }

    /// Least-squares heating rate in degrees per second
    ///
    /// Returns 0 below [`MIN_SAMPLES`] or when every timestamp is equal.
    /// Timestamps are offset from the oldest sample before squaring so the
    /// sums stay well inside f32 precision.
    pub fn slope(&self) -> f32 {
        if self.count < MIN_SAMPLES {
            return 0.0;
        }

        let t0 = match self.sample(0) {
            Some(s) => s.epoch,
            None => return 0.0,
        };

        let n = self.count as f32;
        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        let mut sum_xx = 0.0f32;
        let mut sum_xy = 0.0f32;
        for i in 0..self.count {
            // sample(i) exists for i < count
            let s = match self.sample(i) {
                Some(s) => s,
                None => return 0.0,
            };
            let x = (s.epoch - t0) as f32;
            sum_x += x;
            sum_y += s.temperature;
            sum_xx += x * x;
            sum_xy += x * s.temperature;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return 0.0;
        }
        (n * sum_xy - sum_x * sum_y) / denominator
    }

    /// Seconds until the target at the current rate, or 0 when no
    /// prediction applies
    ///
    /// 0 covers: no target, target already reached, flat or cooling trend,
    /// and estimates beyond [`MAX_LOOKAHEAD_S`].
    pub fn seconds_to_target(&self) -> u32 {
        if self.target <= 0.0 {
            return 0;
        }
        let latest = match self.latest() {
            Some(s) => s.temperature,
            None => return 0,
        };
        if latest >= self.target {
            return 0;
        }
        let slope = self.slope();
        if slope <= 0.0 {
            return 0;
        }

        let seconds = (self.target - latest) / slope;
        if seconds > MAX_LOOKAHEAD_S as f32 {
            return 0;
        }
        seconds as u32
    }
}

impl Default for TrendWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Predictor for both meat probes
#[derive(Debug, Default)]
pub struct Predictor {
    windows: [TrendWindow; MEAT_PROBES],
    last_sample_ms: Option<u64>,
}

impl Predictor {
    /// Create a predictor with empty windows
    pub fn new() -> Self {
        Self::default()
    }

    /// Access one probe's window
    pub fn window(&self, index: usize) -> &TrendWindow {
        &self.windows[index]
    }

    /// Assign a probe's completion target; 0 clears it
    pub fn set_target(&mut self, index: usize, target: f32) {
        self.windows[index].set_target(target);
    }

    /// Discard a probe's samples, preserving its target
    pub fn reset(&mut self, index: usize) {
        self.windows[index].reset();
    }

    /// Record samples for one tick
    ///
    /// Gated at the 5 s cadence. Samples are taken only while the wall
    /// clock is synchronized; invalid probes arrive as `None` and are
    /// skipped without disturbing their window.
    pub fn update(&mut self, now_ms: u64, epoch: Option<u32>, temps: [Option<f32>; MEAT_PROBES]) {
        match self.last_sample_ms {
            Some(last) if now_ms < last + SAMPLE_INTERVAL_MS => return,
            _ => {}
        }
        let Some(epoch) = epoch else { return };
        self.last_sample_ms = Some(now_ms);

        for (window, temp) in self.windows.iter_mut().zip(temps) {
            if let Some(temp) = temp {
                window.record(epoch, temp);
            }
        }
    }

    /// Current prediction for a probe, if one applies
    pub fn prediction(&self, index: usize, now_epoch: u32) -> Option<Prediction> {
        let window = &self.windows[index];
        let seconds = window.seconds_to_target();
        if seconds == 0 {
            return None;
        }
        Some(Prediction {
            rate_per_min: window.slope() * 60.0,
            seconds_remaining: seconds,
            eta_epoch: now_epoch + seconds,
        })
    }
}
