//! Command-line argument definitions using clap
//!
//! Each command has a clap-specific argument struct that converts into the
//! interface-agnostic parameter or request type of `cairn-core`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Planner
//! ```
//!
//! Core types stay free of clap derives. Help text, aliases and delimiter
//! handling live here; business validation stays in the core.
//!
//! ```rust,ignore
//! #[derive(Args)]
//! pub struct AddTaskArgs {
//!     pub slug: String,
//!     pub description: String,
//!     #[arg(long, value_delimiter = ',')]
//!     pub files: Vec<String>,
//! }
//!
//! impl From<AddTaskArgs> for CreateTask {
//!     fn from(val: AddTaskArgs) -> Self { /* field mapping */ }
//! }
//! ```

use cairn_core::{
    params::{CreatePhase, CreatePlan, CreateTask},
    AcceptanceCriterion, PhaseStatus, PlanStatus, Scope, TaskStatus, TaskType,
    UpdatePhaseRequest, UpdatePlanRequest, UpdateTaskRequest,
};
use clap::{Args, Subcommand};

// ============================================================================
// Plans
// ============================================================================

/// Create a new plan
#[derive(Args)]
pub struct CreatePlanArgs {
    /// Identifier of the plan: lowercase letters, digits and hyphens
    pub slug: String,
    /// Title of the plan
    pub title: String,
    /// What the plan sets out to achieve
    #[arg(short, long, default_value = "")]
    pub goal: String,
    /// Background the implementer needs
    #[arg(short, long, default_value = "")]
    pub context: String,
    /// Paths in scope, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,
    /// Paths out of scope, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Protected paths that must not be modified, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub do_not_touch: Vec<String>,
}

impl From<CreatePlanArgs> for CreatePlan {
    fn from(val: CreatePlanArgs) -> Self {
        CreatePlan {
            slug: val.slug,
            title: val.title,
            goal: val.goal,
            context: val.context,
            scope: Scope {
                include: val.include,
                exclude: val.exclude,
                do_not_touch: val.do_not_touch,
            },
        }
    }
}

/// Identify a plan by slug
#[derive(Args)]
pub struct PlanSlugArgs {
    /// Slug of the plan
    pub slug: String,
}

/// Edit the descriptive fields of a plan
///
/// Plans that are implementing, complete or archived, or that have a started
/// task, can no longer be edited.
#[derive(Args)]
pub struct UpdatePlanArgs {
    /// Slug of the plan
    pub slug: String,
    #[arg(short, long, help = "New title")]
    pub title: Option<String>,
    #[arg(short, long, help = "New goal")]
    pub goal: Option<String>,
    #[arg(short, long, help = "New context")]
    pub context: Option<String>,
}

impl From<UpdatePlanArgs> for UpdatePlanRequest {
    fn from(val: UpdatePlanArgs) -> Self {
        UpdatePlanRequest {
            title: val.title,
            goal: val.goal,
            context: val.context,
            scope: None,
        }
    }
}

/// Delete a plan permanently
#[derive(Args)]
pub struct DeletePlanArgs {
    /// Slug of the plan
    pub slug: String,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

/// Move a plan to another status
#[derive(Args)]
pub struct PlanStatusArgs {
    /// Slug of the plan
    pub slug: String,
    #[arg(help = "Target status, e.g. drafted, reviewed, implementing, archived")]
    pub status: PlanStatus,
}

/// Record a review of a plan
#[derive(Args)]
pub struct ReviewPlanArgs {
    /// Slug of the plan
    pub slug: String,
    #[arg(help = "Verdict of the review, e.g. approved or needs_changes")]
    pub verdict: String,
    #[arg(short, long, default_value = "", help = "Summary of the review")]
    pub summary: String,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a new plan
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List plans with their progress
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show a plan with its phases and tasks
    #[command(alias = "s")]
    Show(PlanSlugArgs),
    /// Edit a plan
    #[command(alias = "u")]
    Update(UpdatePlanArgs),
    /// Delete a plan permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
    /// Move a plan to another status
    Status(PlanStatusArgs),
    /// Record a review verdict
    Review(ReviewPlanArgs),
    /// Approve the plan itself
    Promote(PlanSlugArgs),
    /// Approve the plan's phases
    ApprovePhases(PlanSlugArgs),
    /// Approve the plan's tasks
    ApproveTasks(PlanSlugArgs),
}

// ============================================================================
// Tasks
// ============================================================================

/// Parses `given|when|then` into an acceptance criterion.
fn parse_criterion(value: &str) -> Result<AcceptanceCriterion, String> {
    let parts: Vec<&str> = value.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [given, when, then] => Ok(AcceptanceCriterion {
            given: given.to_string(),
            when: when.to_string(),
            then: then.to_string(),
        }),
        _ => Err(format!("expected 'given|when|then', got '{value}'")),
    }
}

/// Add a new task to the end of a plan
#[derive(Args)]
pub struct AddTaskArgs {
    /// Slug of the plan
    pub slug: String,
    /// What the task does
    pub description: String,
    #[arg(
        short = 't',
        long = "type",
        default_value = "implement",
        help = "Kind of work: implement, test, document, review or refactor"
    )]
    pub task_type: TaskType,
    #[arg(short, long, help = "Phase the task belongs to")]
    pub phase: Option<String>,
    #[arg(
        short = 'a',
        long = "criterion",
        value_parser = parse_criterion,
        help = "Acceptance criterion as 'given|when|then' (repeatable)"
    )]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    #[arg(short, long, value_delimiter = ',', help = "Files touched, comma-separated")]
    pub files: Vec<String>,
    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "IDs of tasks this task depends on, comma-separated"
    )]
    pub depends_on: Vec<String>,
}

impl AddTaskArgs {
    /// Splits the arguments into the plan slug and the core parameters.
    pub fn into_params(self) -> (String, CreateTask) {
        let params = CreateTask {
            description: self.description,
            task_type: self.task_type,
            phase_id: self.phase,
            acceptance_criteria: self.acceptance_criteria,
            files: self.files,
            depends_on: self.depends_on,
        };
        (self.slug, params)
    }
}

/// List the tasks of a plan
#[derive(Args)]
pub struct ListTasksArgs {
    /// Slug of the plan
    pub slug: String,
    #[arg(short, long, help = "Only list tasks of this phase")]
    pub phase: Option<String>,
}

/// Identify a task within a plan
#[derive(Args)]
pub struct TaskRefArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the task, e.g. task.auth-feature.1
    pub id: String,
}

/// Edit a task that has not started
#[derive(Args)]
pub struct UpdateTaskArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the task
    pub id: String,
    #[arg(short, long, help = "New description")]
    pub description: Option<String>,
    #[arg(short = 't', long = "type", help = "New kind of work")]
    pub task_type: Option<TaskType>,
    #[arg(short, long, conflicts_with = "no_phase", help = "Assign to this phase")]
    pub phase: Option<String>,
    #[arg(long, help = "Remove the task from its phase")]
    pub no_phase: bool,
    #[arg(
        short = 'a',
        long = "criterion",
        value_parser = parse_criterion,
        help = "Replace acceptance criteria, 'given|when|then' (repeatable)"
    )]
    pub acceptance_criteria: Option<Vec<AcceptanceCriterion>>,
    #[arg(short, long, value_delimiter = ',', help = "Replace files, comma-separated")]
    pub files: Option<Vec<String>>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Replace dependencies, comma-separated task IDs"
    )]
    pub depends_on: Option<Vec<String>>,
}

impl From<UpdateTaskArgs> for UpdateTaskRequest {
    fn from(val: UpdateTaskArgs) -> Self {
        let phase_id = if val.no_phase {
            Some(None)
        } else {
            val.phase.map(Some)
        };
        UpdateTaskRequest {
            description: val.description,
            task_type: val.task_type,
            phase_id,
            acceptance_criteria: val.acceptance_criteria,
            files: val.files,
            depends_on: val.depends_on,
        }
    }
}

/// Move a task to another status
#[derive(Args)]
pub struct TaskStatusArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the task
    pub id: String,
    #[arg(help = "Target status, e.g. in_progress, completed, failed")]
    pub status: TaskStatus,
}

/// Approve a task awaiting approval
#[derive(Args)]
pub struct ApproveTaskArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the task
    pub id: String,
    #[arg(short, long, env = "CAIRN_APPROVER", help = "Who approves")]
    pub by: String,
}

/// Approve every task awaiting approval
#[derive(Args)]
pub struct ApproveAllArgs {
    /// Slug of the plan
    pub slug: String,
    #[arg(short, long, env = "CAIRN_APPROVER", help = "Who approves")]
    pub by: String,
}

/// Reject a task awaiting approval
#[derive(Args)]
pub struct RejectTaskArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the task
    pub id: String,
    #[arg(short, long, help = "Why the task is rejected")]
    pub reason: String,
}

/// Move a task to a 1-based position
#[derive(Args)]
pub struct MoveArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the task or phase
    pub id: String,
    #[arg(help = "1-based target position; out-of-range values are clamped")]
    pub position: usize,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a new task to a plan
    #[command(alias = "a")]
    Add(AddTaskArgs),
    /// List the tasks of a plan
    #[command(aliases = ["l", "ls"])]
    List(ListTasksArgs),
    /// Show one task
    #[command(alias = "s")]
    Show(TaskRefArgs),
    /// Edit a task
    #[command(alias = "u")]
    Update(UpdateTaskArgs),
    /// Delete a task
    #[command(aliases = ["d", "rm"])]
    Delete(TaskRefArgs),
    /// Move a task to another status
    Status(TaskStatusArgs),
    /// Submit a task for approval
    Submit(TaskRefArgs),
    /// Submit every pending task for approval
    SubmitAll(PlanSlugArgs),
    /// Approve a task
    Approve(ApproveTaskArgs),
    /// Approve every task awaiting approval
    ApproveAll(ApproveAllArgs),
    /// Reject a task
    Reject(RejectTaskArgs),
    /// Send a rejected task back for approval
    Resubmit(TaskRefArgs),
    /// Move a task to another position
    #[command(alias = "mv")]
    Move(MoveArgs),
}

// ============================================================================
// Phases
// ============================================================================

/// Add a new phase to the end of a plan
#[derive(Args)]
pub struct AddPhaseArgs {
    /// Slug of the plan
    pub slug: String,
    /// Name of the phase
    pub name: String,
    #[arg(short, long, default_value = "", help = "What the phase covers")]
    pub description: String,
    #[arg(
        long,
        value_delimiter = ',',
        help = "IDs of phases this phase depends on, comma-separated"
    )]
    pub depends_on: Vec<String>,
    #[arg(short, long, help = "Require approval before the phase starts")]
    pub requires_approval: bool,
}

impl AddPhaseArgs {
    /// Splits the arguments into the plan slug and the core parameters.
    pub fn into_params(self) -> (String, CreatePhase) {
        let params = CreatePhase {
            name: self.name,
            description: self.description,
            depends_on: self.depends_on,
            requires_approval: self.requires_approval,
            agent_config: None,
        };
        (self.slug, params)
    }
}

/// Identify a phase within a plan
#[derive(Args)]
pub struct PhaseRefArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the phase, e.g. phase.auth-feature.1
    pub id: String,
}

/// Edit a pending phase
#[derive(Args)]
pub struct UpdatePhaseArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the phase
    pub id: String,
    #[arg(short, long, help = "New name")]
    pub name: Option<String>,
    #[arg(short, long, help = "New description")]
    pub description: Option<String>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Replace dependencies, comma-separated phase IDs"
    )]
    pub depends_on: Option<Vec<String>>,
    #[arg(long, help = "Whether the phase requires approval (true/false)")]
    pub requires_approval: Option<bool>,
}

impl From<UpdatePhaseArgs> for UpdatePhaseRequest {
    fn from(val: UpdatePhaseArgs) -> Self {
        UpdatePhaseRequest {
            name: val.name,
            description: val.description,
            depends_on: val.depends_on,
            requires_approval: val.requires_approval,
            agent_config: None,
        }
    }
}

/// Move a phase to another status
#[derive(Args)]
pub struct PhaseStatusArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the phase
    pub id: String,
    #[arg(help = "Target status: active, complete or failed")]
    pub status: PhaseStatus,
}

/// Approve a phase that requires approval
#[derive(Args)]
pub struct ApprovePhaseArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the phase
    pub id: String,
    #[arg(short, long, env = "CAIRN_APPROVER", help = "Who approves")]
    pub by: String,
}

/// Reject a phase
#[derive(Args)]
pub struct RejectPhaseArgs {
    /// Slug of the plan
    pub slug: String,
    /// ID of the phase
    pub id: String,
    #[arg(short, long, help = "Why the phase is rejected")]
    pub reason: String,
}

/// Rewrite the phase order
#[derive(Args)]
pub struct ReorderPhasesArgs {
    /// Slug of the plan
    pub slug: String,
    /// Every phase ID of the plan, in the new order
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Subcommand)]
pub enum PhaseCommands {
    /// Add a new phase to a plan
    #[command(alias = "a")]
    Add(AddPhaseArgs),
    /// List the phases of a plan
    #[command(aliases = ["l", "ls"])]
    List(PlanSlugArgs),
    /// Show one phase
    #[command(alias = "s")]
    Show(PhaseRefArgs),
    /// Edit a phase
    #[command(alias = "u")]
    Update(UpdatePhaseArgs),
    /// Delete a phase
    #[command(aliases = ["d", "rm"])]
    Delete(PhaseRefArgs),
    /// Move a phase to another status
    Status(PhaseStatusArgs),
    /// Approve a phase
    Approve(ApprovePhaseArgs),
    /// Approve every phase that requires approval
    ApproveAll(ApproveAllArgs),
    /// Reject a phase
    Reject(RejectPhaseArgs),
    /// Move a phase to another position
    #[command(alias = "mv")]
    Move(MoveArgs),
    /// Rewrite the order of all phases
    Reorder(ReorderPhasesArgs),
}
