//! `[scheduler]` section configuration.
//!
//! Tunes the debounce delay heuristic.
//!
//! # Example
//!
//! ```toml
//! [scheduler]
//! keystroke_window = 1000   # inter-edit gaps remembered
//! compile_window = 10       # compile durations remembered
//! gap_factor = 1.5          # tolerance for bursts of fast edits
//! safety_factor = 1.5       # margin against estimation noise
//! max_edit_gap = 5.0        # longer pauses (seconds) start a new editing session
//! ```
//!
//! The proposed delay is
//! `safety_factor * max(gap_factor * mean_gap, mean_compile)`.

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Upper bound accepted for `gap_factor` and `safety_factor`.
pub const MAX_FACTOR: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Capacity of the inter-edit gap window.
    pub keystroke_window: usize,

    /// Capacity of the compile duration window.
    pub compile_window: usize,

    /// Multiplier on the mean inter-edit gap.
    pub gap_factor: f64,

    /// Outer multiplier on the proposed delay.
    pub safety_factor: f64,

    /// Pause in seconds after which an edit opens a new session and its
    /// gap is not recorded.
    pub max_edit_gap: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            keystroke_window: 1000,
            compile_window: 10,
            gap_factor: 1.5,
            safety_factor: 1.5,
            max_edit_gap: 5.0,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.keystroke_window == 0 {
            diag.error("scheduler.keystroke_window", "window capacity must be at least 1");
        }
        if self.compile_window == 0 {
            diag.error("scheduler.compile_window", "window capacity must be at least 1");
        }
        for (field, value) in [
            ("scheduler.gap_factor", self.gap_factor),
            ("scheduler.safety_factor", self.safety_factor),
        ] {
            if !value.is_finite() || !(0.0..=MAX_FACTOR).contains(&value) {
                diag.error_with_hint(
                    field,
                    format!("factor must be between 0 and {MAX_FACTOR} (got {value})"),
                    "the default is 1.5",
                );
            }
        }
        if !self.max_edit_gap.is_finite() || self.max_edit_gap <= 0.0 || self.max_edit_gap > 3600.0
        {
            diag.error_with_hint(
                "scheduler.max_edit_gap",
                format!(
                    "must be a positive number of seconds up to 3600 (got {})",
                    self.max_edit_gap
                ),
                "the default is 5.0",
            );
        }
    }
}
