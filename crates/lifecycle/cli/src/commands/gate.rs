//! Gate preview command

use crate::error::CliResult;
use crate::output::{self, join_cell, print_success, print_warning, OutputFormat};
use lifecycle_engine::LifecycleService;
use lifecycle_types::{ChecklistStatus, EntityKind, StageId};

/// Evaluate the gate on `stage` with the given items marked complete
pub fn execute(
    service: &LifecycleService,
    kind: EntityKind,
    stage: &str,
    completed: &[String],
    format: OutputFormat,
) -> CliResult<()> {
    let checklist = ChecklistStatus::completed(completed.iter().cloned());
    let evaluation = service.check_gate(kind, &StageId::new(stage), &checklist)?;

    if format != OutputFormat::Table {
        return output::print_single(&evaluation, format);
    }

    if evaluation.required_count == 0 {
        print_success(&format!("{} {} is not gated", kind, evaluation.stage));
    } else if evaluation.passed {
        print_success(&format!(
            "Gate on {} {} satisfied ({} of {} items)",
            kind, evaluation.stage, evaluation.required_count, evaluation.required_count
        ));
    } else {
        print_warning(&format!(
            "Gate on {} {} blocked: {} missing ({})",
            kind,
            evaluation.stage,
            evaluation.missing_count,
            join_cell(&evaluation.missing)
        ));
    }
    Ok(())
}
