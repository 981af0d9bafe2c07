//! Progress calculator
//!
//! Derives percent-complete figures from stage position, milestone status
//! and work-item status. Results are whole percentages, rounded to nearest,
//! and always in `0..=100`. Empty sets give 0, never a division by zero.

use crate::catalog::StageCatalog;
use lifecycle_types::{CatalogResult, MilestoneId, Plan, StageId, WorkItem};

/// Computes percent-complete figures
#[derive(Clone, Debug, Default)]
pub struct ProgressCalculator;

impl ProgressCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Position of `stage` in its catalog: `(ordinal + 1) / stage_count`
    pub fn stage_progress(&self, catalog: &StageCatalog, stage: &StageId) -> CatalogResult<u8> {
        let stage = catalog.require_stage(stage)?;
        Ok(percent(stage.ordinal + 1, catalog.stage_count()))
    }

    /// Completed milestones over all milestones
    pub fn plan_progress(&self, plan: &Plan) -> u8 {
        percent(plan.completed_milestones(), plan.milestones.len())
    }

    /// Completed tasks over the tasks under `milestone`
    pub fn milestone_progress(&self, plan: &Plan, milestone: &MilestoneId) -> u8 {
        let tasks = plan.tasks_for(milestone);
        let done = tasks.iter().filter(|t| t.status.is_completed()).count();
        percent(done, tasks.len())
    }

    /// Completed work items over all work items
    pub fn work_item_progress(&self, items: &[WorkItem]) -> u8 {
        let done = items.iter().filter(|i| i.status.is_completed()).count();
        percent(done, items.len())
    }

    /// Recompute and store `plan.progress`
    pub fn refresh(&self, plan: &mut Plan) -> u8 {
        let progress = self.plan_progress(plan);
        plan.progress = Some(progress);
        progress
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = done.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}
