//! Timing estimator: typing speed and compile time → debounce delay.
//!
//! Two fixed-capacity rolling windows hold the most recent inter-edit gaps
//! and compile durations. The proposed delay has to outlast the typical
//! pause between keystrokes (scaled up to tolerate bursts) and must not be
//! shorter than a typical compile:
//!
//! ```text
//! delay = safety_factor * max(gap_factor * mean(gaps), mean(compiles))
//! ```
//!
//! With the default factors of 1.5 this is
//! `1.5 * max(1.5 * mean_gap, mean_compile)`.
//!
//! A pause longer than `max_edit_gap` is not a keystroke gap but the start
//! of a new editing session; it is left out of the gap window.

use std::time::Duration;

use crate::config::SchedulerConfig;

/// Upper bound on any proposed delay.
pub const MAX_DELAY: Duration = Duration::from_secs(300);

/// Fixed-capacity circular buffer of samples in seconds.
///
/// Appends until full, then overwrites the oldest sample.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: Vec<f64>,
    capacity: usize,
    cursor: usize,
}

impl RollingWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.cursor] = sample;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Mean of the retained samples, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Rolling statistics of typing and compiling.
#[derive(Debug, Clone)]
pub struct TimingEstimator {
    keystroke_gaps: RollingWindow,
    compile_durations: RollingWindow,
    gap_factor: f64,
    safety_factor: f64,
    max_edit_gap: Duration,
}

impl TimingEstimator {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            keystroke_gaps: RollingWindow::with_capacity(config.keystroke_window),
            compile_durations: RollingWindow::with_capacity(config.compile_window),
            gap_factor: config.gap_factor,
            safety_factor: config.safety_factor,
            max_edit_gap: Duration::try_from_secs_f64(config.max_edit_gap)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Record the pause before an edit. Returns `false` when the pause
    /// exceeds `max_edit_gap` and was dropped as a session break.
    pub fn record_edit_gap(&mut self, gap: Duration) -> bool {
        if gap > self.max_edit_gap {
            return false;
        }
        self.keystroke_gaps.push(gap.as_secs_f64());
        true
    }

    pub fn record_compile_duration(&mut self, duration: Duration) {
        self.compile_durations.push(duration.as_secs_f64());
    }

    pub fn mean_gap(&self) -> f64 {
        self.keystroke_gaps.mean()
    }

    pub fn mean_compile(&self) -> f64 {
        self.compile_durations.mean()
    }

    /// Proposed delay in seconds. Zero without any history.
    pub fn propose_delay_secs(&self) -> f64 {
        let gap = self.gap_factor * self.mean_gap();
        self.safety_factor * gap.max(self.mean_compile())
    }

    /// Proposed delay, saturated at [`MAX_DELAY`].
    pub fn propose_delay(&self) -> Duration {
        let secs = self.propose_delay_secs();
        if secs.is_nan() || secs >= MAX_DELAY.as_secs_f64() {
            return MAX_DELAY;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    pub fn keystroke_gaps(&self) -> &RollingWindow {
        &self.keystroke_gaps
    }

    pub fn compile_durations(&self) -> &RollingWindow {
        &self.compile_durations
    }
}

impl Default for TimingEstimator {
    fn default() -> Self {
        Self::new(&SchedulerConfig::default())
    }
}
