//! Request types for updating models.
//!
//! Every field is optional; only `Some` fields are applied.

use super::{AcceptanceCriterion, PhaseAgentConfig, Scope, TaskType};

/// Parameters for editing a plan's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlanRequest {
    pub title: Option<String>,
    pub goal: Option<String>,
    pub context: Option<String>,
    pub scope: Option<Scope>,
}

impl UpdatePlanRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.goal.is_none() && self.context.is_none() && self.scope.is_none()
    }
}

/// Parameters for editing a task that has not started.
///
/// `phase_id: Some(None)` detaches the task from its phase.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskRequest {
    pub description: Option<String>,
    pub task_type: Option<TaskType>,
    pub phase_id: Option<Option<String>>,
    pub acceptance_criteria: Option<Vec<AcceptanceCriterion>>,
    pub files: Option<Vec<String>>,
    pub depends_on: Option<Vec<String>>,
}

/// Parameters for editing a pending phase.
#[derive(Debug, Clone, Default)]
pub struct UpdatePhaseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub depends_on: Option<Vec<String>>,
    pub requires_approval: Option<bool>,
    pub agent_config: Option<PhaseAgentConfig>,
}
