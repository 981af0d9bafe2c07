//! Dry-run a sequence of transitions against an in-memory history

use crate::error::CliResult;
use crate::output::{self, print_error, print_success, OutputFormat};
use lifecycle_engine::LifecycleService;
use lifecycle_types::{
    ActorId, ChecklistStatus, EntityId, EntityKind, StageId, TransitionEvent, TransitionOutcome,
};
use serde::Serialize;
use tabled::Tabled;

/// Table row for one recorded event
#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    event: String,
    from: String,
    to: String,
    outcome: String,
    detail: String,
}

impl From<&TransitionEvent> for EventRow {
    fn from(event: &TransitionEvent) -> Self {
        let (outcome, detail) = match &event.outcome {
            TransitionOutcome::Applied => ("applied".to_string(), String::new()),
            TransitionOutcome::Rejected { error, detail } => (error.to_string(), detail.clone()),
        };
        Self {
            event: event.id.short().to_string(),
            from: event.from_stage.to_string(),
            to: event.to_stage.to_string(),
            outcome,
            detail,
        }
    }
}

/// Walk a new entity of `kind` along `path`, stopping at the first refusal
pub fn execute(
    service: &LifecycleService,
    kind: EntityKind,
    path: &[String],
    completed: &[String],
    format: OutputFormat,
) -> CliResult<()> {
    let checklist = ChecklistStatus::completed(completed.iter().cloned());
    let mut entity = service.create_entity(kind, EntityId::generate())?;
    let actor = ActorId::new("lifecycle-cli");

    for to in path {
        match service.attempt_transition(&entity, &StageId::new(to.as_str()), actor.clone(), None, &checklist) {
            Ok(updated) => entity = updated,
            Err(err) if err.as_transition().is_some() => {
                if format == OutputFormat::Table {
                    print_error(&err.to_string());
                }
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let rows: Vec<EventRow> = service
        .history(kind, &entity.id)?
        .iter()
        .map(EventRow::from)
        .collect();
    output::print_output(rows, format)?;

    if format == OutputFormat::Table {
        let progress = service.stage_progress(kind, entity.stage())?;
        print_success(&format!(
            "{} ended at {} ({}% through its catalog)",
            kind,
            entity.stage(),
            progress
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifecycle_engine::LifecycleConfig;

    #[test]
    fn test_event_row_for_rejection() {
        let service = LifecycleService::from_config(&LifecycleConfig::builtin().unwrap()).unwrap();
        let lead = service
            .create_entity(EntityKind::Lead, EntityId::new("lead-1"))
            .unwrap();
        let _ = service.attempt_transition(
            &lead,
            &StageId::new("ACCESS"),
            ActorId::new("t"),
            None,
            &ChecklistStatus::new(),
        );

        let history = service.history(EntityKind::Lead, &lead.id).unwrap();
        let row = EventRow::from(&history[0]);
        assert_eq!(row.outcome, "InvalidTransition");
        assert_eq!(row.from, "NEW");
        assert!(row.detail.contains("NEW -> ACCESS"));
    }
}
