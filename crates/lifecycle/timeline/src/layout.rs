//! Timeline layout engine: bars, axis ticks, groups and the "now" marker

use crate::{resolve_milestone, resolve_task, EffectiveRange, LayoutOptions, TimelineWindow};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lifecycle_types::{MilestoneId, Plan, TaskId, WorkStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a bar represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Milestone,
    Task,
}

/// Horizontal geometry of one item, in percent of the chart width
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub item_id: String,
    pub kind: ItemKind,
    pub label: String,
    pub status: WorkStatus,
    /// Resolved start date before clipping
    pub start: NaiveDate,
    /// Resolved end date before clipping
    pub end: NaiveDate,
    pub left_percent: f64,
    pub width_percent: f64,
    /// The item extends outside the window and was cut to fit
    pub clipped: bool,
}

impl BarGeometry {
    pub fn right_percent(&self) -> f64 {
        self.left_percent + self.width_percent
    }
}

/// One axis label
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickLabel {
    pub day_offset: i64,
    pub date: NaiveDate,
    pub percent: f64,
    pub label: String,
}

/// Milestone with its tasks, or the bucket of tasks without a milestone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineGroup {
    /// `None` for the unassigned bucket
    pub milestone_id: Option<MilestoneId>,
    pub label: String,
    pub task_ids: Vec<TaskId>,
}

impl TimelineGroup {
    pub fn is_unassigned(&self) -> bool {
        self.milestone_id.is_none()
    }
}

/// Span covered by the milestones tagged with one phase
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpan {
    pub phase: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub left_percent: f64,
    pub width_percent: f64,
    pub milestone_count: usize,
}

/// Everything needed to render a plan's timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineLayout {
    pub window: TimelineWindow,
    pub axis: Vec<TickLabel>,
    pub bars: Vec<BarGeometry>,
    pub groups: Vec<TimelineGroup>,
    pub phases: Vec<PhaseSpan>,
    pub today_percent: f64,
}

impl TimelineLayout {
    pub fn bar(&self, item_id: &str) -> Option<&BarGeometry> {
        self.bars.iter().find(|b| b.item_id == item_id)
    }

    pub fn unassigned(&self) -> Option<&TimelineGroup> {
        self.groups.iter().find(|g| g.is_unassigned())
    }
}

/// Lays plans out on a normalized horizontal axis.
///
/// Stateless apart from its options; safe to share and call concurrently.
#[derive(Clone, Debug, Default)]
pub struct TimelineLayoutEngine {
    options: LayoutOptions,
}

impl TimelineLayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out `plan` with the "now" marker at the current time
    pub fn layout(&self, plan: &Plan) -> TimelineLayout {
        self.layout_at(plan, Utc::now())
    }

    /// Lay out `plan` with the "now" marker at `now`
    pub fn layout_at(&self, plan: &Plan, now: DateTime<Utc>) -> TimelineLayout {
        let window = TimelineWindow::for_plan(plan, now.date_naive(), &self.options);

        let mut bars = Vec::with_capacity(plan.milestones.len() + plan.tasks.len());
        let mut groups = Vec::with_capacity(plan.milestones.len() + 1);
        let mut placed: HashSet<&TaskId> = HashSet::new();

        for milestone in &plan.milestones {
            let range = resolve_milestone(milestone, &window);
            bars.push(self.bar(
                milestone.id.to_string(),
                ItemKind::Milestone,
                milestone.name.clone(),
                milestone.status,
                range,
                &window,
            ));

            let mut task_ids = Vec::new();
            for task in plan.tasks_for(&milestone.id) {
                if !placed.insert(&task.id) {
                    continue;
                }
                let range = resolve_task(task, plan, &window);
                bars.push(self.bar(
                    task.id.to_string(),
                    ItemKind::Task,
                    task.title.clone(),
                    task.status,
                    range,
                    &window,
                ));
                task_ids.push(task.id.clone());
            }

            groups.push(TimelineGroup {
                milestone_id: Some(milestone.id.clone()),
                label: milestone.name.clone(),
                task_ids,
            });
        }

        // Tasks with no milestone, or one that isn't in the plan
        let mut unassigned = Vec::new();
        for task in &plan.tasks {
            if placed.contains(&task.id) {
                continue;
            }
            let range = resolve_task(task, plan, &window);
            bars.push(self.bar(
                task.id.to_string(),
                ItemKind::Task,
                task.title.clone(),
                task.status,
                range,
                &window,
            ));
            unassigned.push(task.id.clone());
        }
        if !unassigned.is_empty() {
            groups.push(TimelineGroup {
                milestone_id: None,
                label: self.options.unassigned_label.clone(),
                task_ids: unassigned,
            });
        }

        let layout = TimelineLayout {
            axis: self.axis(&window),
            phases: self.phases(plan, &window),
            today_percent: window.position_of(now),
            window,
            bars,
            groups,
        };

        tracing::debug!(
            plan = %plan.id,
            total_days = layout.window.total_days,
            bars = layout.bars.len(),
            synthetic = layout.window.synthetic,
            "Timeline laid out"
        );
        layout
    }

    /// Place one resolved range on the axis
    fn bar(
        &self,
        item_id: String,
        kind: ItemKind,
        label: String,
        status: WorkStatus,
        range: EffectiveRange,
        window: &TimelineWindow,
    ) -> BarGeometry {
        let (left_percent, width_percent, cut) = place(range, window);
        let clipped = cut || range.exceeds(window);
        if clipped {
            tracing::trace!(item = %item_id, start = %range.start, end = %range.end, "Bar clipped to window");
        }
        BarGeometry {
            item_id,
            kind,
            label,
            status,
            start: range.start,
            end: range.end,
            left_percent,
            width_percent,
            clipped,
        }
    }

    /// Tick labels every `ceil(total_days / target)` days, from day 0 to the window end
    fn axis(&self, window: &TimelineWindow) -> Vec<TickLabel> {
        let stride = self.options.tick_stride(window.total_days);
        let mut ticks = Vec::new();
        let mut day = 0;
        while day <= window.total_days {
            let date = window.start + Duration::days(day);
            ticks.push(TickLabel {
                day_offset: day,
                date,
                percent: window.percent(day as f64),
                label: date.format(&self.options.tick_label_format).to_string(),
            });
            day += stride;
        }
        ticks
    }

    /// Phase spans in plan order, then phases only found on milestones
    fn phases(&self, plan: &Plan, window: &TimelineWindow) -> Vec<PhaseSpan> {
        let mut order: Vec<&str> = plan.phases.iter().map(String::as_str).collect();
        for phase in plan.milestones.iter().filter_map(|m| m.phase.as_deref()) {
            if !order.contains(&phase) {
                order.push(phase);
            }
        }

        order
            .into_iter()
            .filter_map(|phase| {
                let ranges: Vec<EffectiveRange> = plan
                    .milestones
                    .iter()
                    .filter(|m| m.phase.as_deref() == Some(phase))
                    .map(|m| resolve_milestone(m, window))
                    .collect();
                let start = ranges.iter().map(|r| r.start).min()?;
                let end = ranges.iter().map(|r| r.end).max()?;
                let (left_percent, width_percent, _) = place(EffectiveRange { start, end }, window);
                Some(PhaseSpan {
                    phase: phase.to_string(),
                    start,
                    end,
                    left_percent,
                    width_percent,
                    milestone_count: ranges.len(),
                })
            })
            .collect()
    }
}

/// `(left, width, cut)` for a range: left clamped to `[0, 100]`, width to
/// `[0, 100 - left]`. `cut` is set when the width had to be reduced.
fn place(range: EffectiveRange, window: &TimelineWindow) -> (f64, f64, bool) {
    let offset_days = window.day_offset(range.start).max(0);
    let left = window.percent(offset_days as f64).min(100.0);
    let natural_width = window.percent(range.duration_days() as f64);
    let width = natural_width.min(100.0 - left).max(0.0);
    (left, width, width < natural_width)
}
