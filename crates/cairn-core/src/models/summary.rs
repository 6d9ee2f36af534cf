//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Phase, PhaseStatus, Plan, PlanStatus, Task, TaskStatus};
use crate::error::WorkflowError;

/// Summary information about a plan with task and phase statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    /// Effective status of the plan
    pub status: PlanStatus,
    pub created_at: Timestamp,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub failed_tasks: u32,
    /// Tasks waiting on a reviewer
    pub awaiting_approval: u32,
    pub total_phases: u32,
    pub completed_phases: u32,
}

impl PlanSummary {
    /// Build a summary from a plan and its loaded collections.
    pub fn from_plan(plan: &Plan, tasks: &[Task], phases: &[Phase]) -> Self {
        let count_tasks = |status: TaskStatus| {
            tasks.iter().filter(|task| task.status == status).count() as u32
        };

        Self {
            id: plan.id.clone(),
            slug: plan.slug.clone(),
            title: plan.title.clone(),
            status: plan.effective_status(),
            created_at: plan.created_at,
            total_tasks: tasks.len() as u32,
            completed_tasks: count_tasks(TaskStatus::Completed),
            failed_tasks: count_tasks(TaskStatus::Failed),
            awaiting_approval: count_tasks(TaskStatus::PendingApproval),
            total_phases: phases.len() as u32,
            completed_phases: phases
                .iter()
                .filter(|phase| phase.status == PhaseStatus::Complete)
                .count() as u32,
        }
    }
}

/// A plan directory that could not be loaded while listing plans.
#[derive(Debug)]
pub struct PlanLoadFailure {
    pub slug: String,
    pub error: WorkflowError,
}

/// Outcome of listing every plan: the plans that loaded, plus one failure
/// per plan document that could not be read or parsed.
#[derive(Debug, Default)]
pub struct ListPlansResult {
    pub plans: Vec<Plan>,
    pub errors: Vec<PlanLoadFailure>,
}

impl ListPlansResult {
    /// True when every plan directory loaded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}
