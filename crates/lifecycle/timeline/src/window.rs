//! The date window a timeline is drawn against

use crate::LayoutOptions;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lifecycle_types::Plan;
use serde::{Deserialize, Serialize};

/// The `[start, end]` range mapped onto the `[0, 100]` axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Whole days between start and end, always at least one
    pub total_days: i64,
    /// True when plan dates were missing or inverted and a fallback was used
    pub synthetic: bool,
}

impl TimelineWindow {
    /// Window for `plan`, falling back to a synthetic window anchored at the
    /// plan start, or at `today` when the plan has no start.
    pub fn for_plan(plan: &Plan, today: NaiveDate, options: &LayoutOptions) -> Self {
        match (plan.start_date, plan.target_end_date) {
            (Some(start), Some(end)) if end > start => Self {
                start,
                end,
                total_days: (end - start).num_days(),
                synthetic: false,
            },
            (start, _) => {
                let anchor = start.unwrap_or(today);
                let days = i64::from(options.synthetic_window_days.max(1));
                tracing::debug!(
                    plan = %plan.id,
                    anchor = %anchor,
                    days,
                    "Plan dates unusable, using synthetic timeline window"
                );
                Self {
                    start: anchor,
                    end: anchor + Duration::days(days),
                    total_days: days,
                    synthetic: true,
                }
            }
        }
    }

    /// Signed whole days from the window start to `date`
    pub fn day_offset(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days()
    }

    /// Percentage of the window covered by `days`
    pub fn percent(&self, days: f64) -> f64 {
        days / self.total_days as f64 * 100.0
    }

    /// Position of `now` on the axis, clamped to `[0, 100]`
    pub fn position_of(&self, now: DateTime<Utc>) -> f64 {
        let origin = self.start.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        let elapsed_days = match origin {
            Some(origin) => (now - origin).num_seconds() as f64 / 86_400.0,
            None => 0.0,
        };
        self.percent(elapsed_days).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plan_window() {
        let plan = Plan::new("p", "p").with_window(date(2024, 1, 1), date(2024, 1, 31));
        let w = TimelineWindow::for_plan(&plan, date(2030, 1, 1), &LayoutOptions::default());
        assert_eq!(w.total_days, 30);
        assert!(!w.synthetic);
        assert_eq!(w.day_offset(date(2024, 1, 16)), 15);
    }

    #[test]
    fn test_inverted_dates_use_synthetic_window_at_start() {
        let plan = Plan::new("p", "p").with_window(date(2024, 3, 1), date(2024, 2, 1));
        let w = TimelineWindow::for_plan(&plan, date(2030, 1, 1), &LayoutOptions::default());
        assert!(w.synthetic);
        assert_eq!(w.start, date(2024, 3, 1));
        assert_eq!(w.total_days, 30);
    }

    #[test]
    fn test_equal_dates_use_synthetic_window() {
        let plan = Plan::new("p", "p").with_window(date(2024, 3, 1), date(2024, 3, 1));
        let w = TimelineWindow::for_plan(&plan, date(2030, 1, 1), &LayoutOptions::default());
        assert!(w.synthetic);
        assert_eq!(w.end, date(2024, 3, 31));
    }

    #[test]
    fn test_missing_start_anchors_at_today() {
        let mut plan = Plan::new("p", "p");
        plan.target_end_date = Some(date(2024, 6, 1));
        let today = date(2024, 5, 10);
        let w = TimelineWindow::for_plan(
            &plan,
            today,
            &LayoutOptions::default().with_synthetic_window_days(14),
        );
        assert!(w.synthetic);
        assert_eq!(w.start, today);
        assert_eq!(w.total_days, 14);
    }

    #[test]
    fn test_now_position_is_clamped() {
        let plan = Plan::new("p", "p").with_window(date(2024, 1, 1), date(2024, 1, 31));
        let w = TimelineWindow::for_plan(&plan, date(2024, 1, 1), &LayoutOptions::default());

        let before = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mid = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();

        assert_eq!(w.position_of(before), 0.0);
        assert_eq!(w.position_of(after), 100.0);
        assert!((w.position_of(mid) - 20.0).abs() < 1e-9);
    }
}
