//! Parameter structures for cairn operations.
//!
//! These structures are shared across interfaces without framework-specific
//! derives. An interface layer (the CLI's clap arguments, a future HTTP
//! handler) converts its own input types into these before calling the
//! [`Planner`](crate::Planner).
//!
//! ```ignore
//! // In the CLI
//! #[derive(Args)]
//! pub struct CreateTaskArgs {
//!     pub slug: String,
//!     pub description: String,
//! }
//!
//! impl From<CreateTaskArgs> for CreateTask {
//!     fn from(args: CreateTaskArgs) -> Self {
//!         CreateTask {
//!             description: args.description,
//!             ..Default::default()
//!         }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{AcceptanceCriterion, PhaseAgentConfig, Scope, TaskType};

/// Parameters for creating a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePlan {
    /// Identifier of the plan, unique within the project (required)
    pub slug: String,
    /// Title of the plan (required)
    pub title: String,
    /// What the plan sets out to achieve
    #[serde(default)]
    pub goal: String,
    /// Background the implementer needs
    #[serde(default)]
    pub context: String,
    /// Files the plan may and may not touch
    #[serde(default)]
    pub scope: Scope,
}

/// Parameters for adding a task to a plan.
///
/// The task is appended at the end of the plan's sequence with status
/// `pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    /// What the task does (required)
    pub description: String,
    /// Kind of work; defaults to `implement`
    #[serde(default, rename = "type")]
    pub task_type: TaskType,
    /// Phase the task belongs to; must exist in the same plan
    #[serde(default)]
    pub phase_id: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    /// Files the task is expected to touch
    #[serde(default)]
    pub files: Vec<String>,
    /// IDs of tasks in the same plan that must finish first
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// Parameters for adding a phase to a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePhase {
    /// Name of the phase (required)
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// IDs of phases in the same plan that must finish first
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Whether the phase must be approved before it starts
    #[serde(default)]
    pub requires_approval: bool,
    /// Opaque configuration passed through to whatever executes the phase
    #[serde(default)]
    pub agent_config: Option<PhaseAgentConfig>,
}
