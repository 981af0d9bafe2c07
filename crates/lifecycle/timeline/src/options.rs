//! Layout tuning knobs, loadable from configuration

use serde::{Deserialize, Serialize};

/// Options controlling timeline layout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Length of the fallback window used when plan dates are missing or inverted
    pub synthetic_window_days: u32,
    /// Approximate number of axis ticks; the stride is `ceil(total_days / target)`
    pub target_tick_count: u32,
    /// `chrono` format string for tick labels
    pub tick_label_format: String,
    /// Label of the bucket holding tasks without a milestone
    pub unassigned_label: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            synthetic_window_days: 30,
            target_tick_count: 10,
            tick_label_format: "%b %d".to_string(),
            unassigned_label: "Unassigned".to_string(),
        }
    }
}

impl LayoutOptions {
    pub fn with_synthetic_window_days(mut self, days: u32) -> Self {
        self.synthetic_window_days = days;
        self
    }

    pub fn with_target_tick_count(mut self, count: u32) -> Self {
        self.target_tick_count = count;
        self
    }

    pub fn with_tick_label_format(mut self, format: impl Into<String>) -> Self {
        self.tick_label_format = format.into();
        self
    }

    /// Axis stride in days for a window of `total_days`, never below one
    pub fn tick_stride(&self, total_days: i64) -> i64 {
        let target = i64::from(self.target_tick_count.max(1));
        let total = total_days.max(1);
        ((total + target - 1) / target).max(1)
    }
}
