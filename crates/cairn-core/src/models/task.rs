//! Task model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{TaskStatus, TaskType};

/// BDD-style condition a task must satisfy to be considered done.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptanceCriterion {
    /// The precondition
    pub given: String,

    /// The action being performed
    pub when: String,

    /// The expected outcome
    pub then: String,
}

/// The unit of work actually executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Identifier assigned at creation (`task.{slug}.{n}`); never changes
    pub id: String,

    /// ID of the parent plan
    pub plan_id: String,

    /// Phase grouping, if the plan uses phases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<String>,

    /// Position within the plan (1-based, contiguous)
    pub sequence: u32,

    /// What to do
    pub description: String,

    #[serde(rename = "type", default)]
    pub task_type: TaskType,

    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,

    /// Files the task is expected to touch
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Task IDs that must complete before this one starts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<Timestamp>,

    /// Reason given by the last rejection; kept through resubmission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    /// Set exactly when the task is `completed` or `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    pub created_at: Timestamp,
}

impl Task {
    /// Moves the task to `target` and updates the fields tied to status.
    ///
    /// Callers must have validated the edge. `started_at` is only written on
    /// the first entry into `in_progress`.
    pub(crate) fn enter_status(&mut self, target: TaskStatus, now: Timestamp) {
        self.status = target;
        match target {
            TaskStatus::InProgress => {
                self.started_at.get_or_insert(now);
            }
            TaskStatus::Approved => {
                self.rejection_reason = None;
            }
            _ => {}
        }
        self.completed_at = if target.is_terminal() { Some(now) } else { None };
    }

    /// Records a reviewer's approval.
    pub(crate) fn approve(&mut self, approved_by: &str, now: Timestamp) {
        self.enter_status(TaskStatus::Approved, now);
        self.approved_by = Some(approved_by.to_string());
        self.approved_at = Some(now);
    }

    /// Records a reviewer's rejection.
    pub(crate) fn reject(&mut self, reason: &str, now: Timestamp) {
        self.enter_status(TaskStatus::Rejected, now);
        self.rejection_reason = Some(reason.to_string());
        self.clear_approval();
    }

    pub(crate) fn clear_approval(&mut self) {
        self.approved_by = None;
        self.approved_at = None;
    }
}
