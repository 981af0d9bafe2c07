//! Effective date resolution for milestones and tasks
//!
//! Missing dates fall back along the chain own → parent milestone → plan
//! window. The plan window is the synthetic one when plan dates are unusable.

use crate::TimelineWindow;
use chrono::NaiveDate;
use lifecycle_types::{Milestone, Plan, Task};
use serde::{Deserialize, Serialize};

/// A resolved, inclusive date range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EffectiveRange {
    /// Inclusive length in days, never below one
    pub fn duration_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }

    /// Whether any part of the range lies outside `window`
    pub fn exceeds(&self, window: &TimelineWindow) -> bool {
        self.start < window.start || self.end > window.end
    }
}

/// Milestone start defaults to the window start; the due date is always set
pub fn resolve_milestone(milestone: &Milestone, window: &TimelineWindow) -> EffectiveRange {
    EffectiveRange {
        start: milestone.start_date.unwrap_or(window.start),
        end: milestone.due_date,
    }
}

/// Task dates fall back to the parent milestone's resolved range, then the window
pub fn resolve_task(task: &Task, plan: &Plan, window: &TimelineWindow) -> EffectiveRange {
    let parent = task
        .milestone_id
        .as_ref()
        .and_then(|id| plan.milestone(id))
        .map(|m| resolve_milestone(m, window));

    EffectiveRange {
        start: task
            .start_date
            .or(parent.map(|p| p.start))
            .unwrap_or(window.start),
        end: task.due_date.or(parent.map(|p| p.end)).unwrap_or(window.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutOptions;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan() -> Plan {
        Plan::new("p", "p")
            .with_window(date(2024, 1, 1), date(2024, 1, 31))
            .with_milestone(
                Milestone::new("m-1", "Design", date(2024, 1, 12)).with_start(date(2024, 1, 5)),
            )
            .with_milestone(Milestone::new("m-2", "Build", date(2024, 1, 25)))
    }

    fn window(plan: &Plan) -> TimelineWindow {
        TimelineWindow::for_plan(plan, date(2024, 1, 1), &LayoutOptions::default())
    }

    #[test]
    fn test_milestone_start_defaults_to_plan_start() {
        let plan = plan();
        let w = window(&plan);
        let r = resolve_milestone(&plan.milestones[1], &w);
        assert_eq!(r.start, date(2024, 1, 1));
        assert_eq!(r.end, date(2024, 1, 25));
    }

    #[test]
    fn test_task_uses_own_dates_first() {
        let plan = plan();
        let w = window(&plan);
        let task = Task::new("t", "t")
            .under("m-1")
            .with_dates(Some(date(2024, 1, 7)), Some(date(2024, 1, 9)));
        let r = resolve_task(&task, &plan, &w);
        assert_eq!((r.start, r.end), (date(2024, 1, 7), date(2024, 1, 9)));
    }

    #[test]
    fn test_task_falls_back_to_milestone() {
        let plan = plan();
        let w = window(&plan);
        let task = Task::new("t", "t").under("m-1").with_dates(None, Some(date(2024, 1, 8)));
        let r = resolve_task(&task, &plan, &w);
        assert_eq!((r.start, r.end), (date(2024, 1, 5), date(2024, 1, 8)));
    }

    #[test]
    fn test_task_falls_back_to_plan() {
        let plan = plan();
        let w = window(&plan);
        let orphan = Task::new("t", "t").under("missing");
        let r = resolve_task(&orphan, &plan, &w);
        assert_eq!((r.start, r.end), (date(2024, 1, 1), date(2024, 1, 31)));
    }

    #[test]
    fn test_duration_is_inclusive_and_at_least_one() {
        let single = EffectiveRange {
            start: date(2024, 1, 3),
            end: date(2024, 1, 3),
        };
        assert_eq!(single.duration_days(), 1);

        let inverted = EffectiveRange {
            start: date(2024, 1, 10),
            end: date(2024, 1, 3),
        };
        assert_eq!(inverted.duration_days(), 1);
    }
}
