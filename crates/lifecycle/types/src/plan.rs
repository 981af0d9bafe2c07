//! Plans, milestones and tasks
//!
//! A Plan is a dated container of milestones and tasks. Its stored progress
//! is derived and never authoritative; the progress calculator recomputes it
//! from milestone status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a plan
    PlanId
);
string_id!(
    /// Unique identifier for a milestone
    MilestoneId
);
string_id!(
    /// Unique identifier for a task
    TaskId
);

// ── Status and Priority ──────────────────────────────────────────────

/// Completion status shared by milestones, tasks and entity work items
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Blocked,
    Delayed,
}

impl WorkStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Blocked => "BLOCKED",
            Self::Delayed => "DELAYED",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

// ── Milestone ────────────────────────────────────────────────────────

/// A dated checkpoint in a plan
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub name: String,
    /// Phase tag, matching one of the plan's phases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Defaults to the plan start when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<String>,
}

impl Milestone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: MilestoneId::new(id),
            name: name.into(),
            phase: None,
            start_date: None,
            due_date,
            status: WorkStatus::NotStarted,
            deliverables: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_status(mut self, status: WorkStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_deliverable(mut self, label: impl Into<String>) -> Self {
        self.deliverables.push(label.into());
        self
    }
}

// ── Task ─────────────────────────────────────────────────────────────

/// A unit of work, optionally under a milestone.
///
/// Missing dates fall back to the parent milestone's, then the plan's.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<MilestoneId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Estimated effort in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(id),
            milestone_id: None,
            title: title.into(),
            start_date: None,
            due_date: None,
            status: WorkStatus::NotStarted,
            priority: TaskPriority::Medium,
            estimated_hours: None,
            assignee: None,
        }
    }

    pub fn under(mut self, milestone: impl Into<String>) -> Self {
        self.milestone_id = Some(MilestoneId::new(milestone));
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, due: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.due_date = due;
        self
    }

    pub fn with_status(mut self, status: WorkStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}

// ── Plan ─────────────────────────────────────────────────────────────

/// A schedulable container of milestones and tasks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_end_date: Option<NaiveDate>,
    /// Ordered phase names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Last stored percent complete. Derived, not authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl Plan {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PlanId::new(id),
            name: name.into(),
            start_date: None,
            target_end_date: None,
            phases: Vec::new(),
            milestones: Vec::new(),
            tasks: Vec::new(),
            progress: None,
        }
    }

    pub fn with_window(mut self, start: NaiveDate, target_end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.target_end_date = Some(target_end);
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phases.push(phase.into());
        self
    }

    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.milestones.push(milestone);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn milestone(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }

    /// Tasks whose `milestone_id` is `id`
    pub fn tasks_for(&self, id: &MilestoneId) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.milestone_id.as_ref() == Some(id))
            .collect()
    }

    pub fn completed_milestones(&self) -> usize {
        self.milestones
            .iter()
            .filter(|m| m.status.is_completed())
            .count()
    }
}
