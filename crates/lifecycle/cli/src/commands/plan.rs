//! Plan commands: progress and timeline layout

use crate::error::{CliError, CliResult};
use crate::output::{self, print_info, print_warning, OutputFormat};
use chrono::{NaiveDate, Utc};
use lifecycle_engine::LifecycleService;
use lifecycle_timeline::{BarGeometry, ItemKind, TimelineLayout};
use lifecycle_types::Plan;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

/// Read a plan from a JSON or YAML file
pub fn load_plan(path: &Path) -> CliResult<Plan> {
    let contents = std::fs::read_to_string(path)?;
    let plan = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
        _ => serde_json::from_str(&contents)?,
    };
    Ok(plan)
}

/// Table row for milestone progress
#[derive(Debug, Serialize, Tabled)]
struct MilestoneRow {
    milestone: String,
    name: String,
    status: String,
    due: String,
    tasks: usize,
    progress: String,
}

#[derive(Debug, Serialize)]
struct ProgressReport {
    plan: String,
    progress: u8,
    milestones: Vec<MilestoneRow>,
}

fn progress_report(service: &LifecycleService, plan: &Plan) -> ProgressReport {
    let calc = service.progress();
    let milestones = plan
        .milestones
        .iter()
        .map(|m| MilestoneRow {
            milestone: m.id.to_string(),
            name: m.name.clone(),
            status: m.status.to_string(),
            due: m.due_date.to_string(),
            tasks: plan.tasks_for(&m.id).len(),
            progress: format!("{}%", calc.milestone_progress(plan, &m.id)),
        })
        .collect();

    ProgressReport {
        plan: plan.id.to_string(),
        progress: service.plan_progress(plan),
        milestones,
    }
}

/// Print plan and per-milestone progress
pub fn progress(service: &LifecycleService, path: &Path, format: OutputFormat) -> CliResult<()> {
    let plan = load_plan(path)?;
    let report = progress_report(service, &plan);

    if format != OutputFormat::Table {
        return output::print_single(&report, format);
    }

    print_info(&format!(
        "Plan {} is {}% complete ({} of {} milestones)",
        report.plan,
        report.progress,
        plan.completed_milestones(),
        plan.milestones.len()
    ));
    output::print_output(report.milestones, format)
}

/// Table row for one timeline bar
#[derive(Debug, Serialize, Tabled)]
struct BarRow {
    item: String,
    kind: String,
    label: String,
    start: String,
    end: String,
    left: String,
    width: String,
    clipped: bool,
}

impl From<&BarGeometry> for BarRow {
    fn from(bar: &BarGeometry) -> Self {
        let kind = match bar.kind {
            ItemKind::Milestone => "milestone",
            ItemKind::Task => "  task",
        };
        Self {
            item: bar.item_id.clone(),
            kind: kind.to_string(),
            label: bar.label.clone(),
            start: bar.start.to_string(),
            end: bar.end.to_string(),
            left: format!("{:.1}%", bar.left_percent),
            width: format!("{:.1}%", bar.width_percent),
            clipped: bar.clipped,
        }
    }
}

fn compute_layout(
    service: &LifecycleService,
    plan: &Plan,
    today: Option<NaiveDate>,
) -> CliResult<TimelineLayout> {
    match today {
        Some(day) => {
            let now = day
                .and_hms_opt(0, 0, 0)
                .map(|t| t.and_utc())
                .ok_or_else(|| CliError::InvalidInput(format!("bad date {day}")))?;
            Ok(service.layout_at(plan, now))
        }
        None => Ok(service.layout_at(plan, Utc::now())),
    }
}

/// Print the timeline layout of a plan
pub fn layout(
    service: &LifecycleService,
    path: &Path,
    today: Option<NaiveDate>,
    format: OutputFormat,
) -> CliResult<()> {
    let plan = load_plan(path)?;
    let layout = compute_layout(service, &plan, today)?;

    if format != OutputFormat::Table {
        return output::print_single(&layout, format);
    }

    let window = &layout.window;
    print_info(&format!(
        "{} to {} ({} days{}), today at {:.1}%",
        window.start,
        window.end,
        window.total_days,
        if window.synthetic { ", synthetic" } else { "" },
        layout.today_percent
    ));

    let clipped = layout.bars.iter().filter(|b| b.clipped).count();
    if clipped > 0 {
        print_warning(&format!("{clipped} bar(s) extend outside the plan window"));
    }

    let rows: Vec<BarRow> = layout.bars.iter().map(BarRow::from).collect();
    output::print_output(rows, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifecycle_engine::LifecycleConfig;
    use std::io::Write;

    fn service() -> LifecycleService {
        LifecycleService::from_config(&LifecycleConfig::builtin().unwrap()).unwrap()
    }

    const PLAN: &str = r#"{
        "id": "plan-1",
        "name": "Launch",
        "start_date": "2024-01-01",
        "target_end_date": "2024-01-31",
        "milestones": [
            {"id": "m-1", "name": "Beta", "start_date": "2024-01-28", "due_date": "2024-02-15"},
            {"id": "m-2", "name": "Kickoff", "due_date": "2024-01-05", "status": "COMPLETED"}
        ],
        "tasks": [
            {"id": "t-1", "title": "Invite list", "milestone_id": "m-2", "status": "COMPLETED"},
            {"id": "t-2", "title": "Venue", "milestone_id": "m-2"}
        ]
    }"#;

    fn plan_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_plan_json() {
        let file = plan_file();
        let plan = load_plan(file.path()).unwrap();
        assert_eq!(plan.milestones.len(), 2);
    }

    #[test]
    fn test_progress_report() {
        let plan: Plan = serde_json::from_str(PLAN).unwrap();
        let report = progress_report(&service(), &plan);
        assert_eq!(report.progress, 50);
        assert_eq!(report.milestones[1].progress, "50%");
        assert_eq!(report.milestones[0].tasks, 0);
    }

    #[test]
    fn test_layout_with_fixed_today() {
        let plan: Plan = serde_json::from_str(PLAN).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 16);
        let layout = compute_layout(&service(), &plan, today).unwrap();
        assert!((layout.today_percent - 50.0).abs() < 1e-9);

        let row = BarRow::from(layout.bar("m-1").unwrap());
        assert_eq!(row.left, "90.0%");
        assert_eq!(row.width, "10.0%");
        assert!(row.clipped);
    }

    #[test]
    fn test_missing_plan_file() {
        let err = load_plan(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
