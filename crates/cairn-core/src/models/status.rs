//! Status enumerations and their transition tables.
//!
//! Each table is a pure function from `(current, target)` to whether the
//! edge exists. Callers apply side effects (timestamps, approval fields)
//! after the edge has been accepted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a plan.
///
/// The ordered stages are `created → drafted → reviewed → approved →
/// phases_generated → phases_approved → tasks_generated → tasks_approved →
/// implementing → complete → archived`. The first three stages may also exit
/// to the terminal `rejected` status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Created,
    Drafted,
    Reviewed,
    Approved,
    PhasesGenerated,
    PhasesApproved,
    TasksGenerated,
    TasksApproved,
    Implementing,
    Complete,
    Archived,
    Rejected,
}

impl PlanStatus {
    /// Every plan status in stage order, `rejected` last.
    pub const ALL: [PlanStatus; 12] = [
        PlanStatus::Created,
        PlanStatus::Drafted,
        PlanStatus::Reviewed,
        PlanStatus::Approved,
        PlanStatus::PhasesGenerated,
        PlanStatus::PhasesApproved,
        PlanStatus::TasksGenerated,
        PlanStatus::TasksApproved,
        PlanStatus::Implementing,
        PlanStatus::Complete,
        PlanStatus::Archived,
        PlanStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Created => "created",
            PlanStatus::Drafted => "drafted",
            PlanStatus::Reviewed => "reviewed",
            PlanStatus::Approved => "approved",
            PlanStatus::PhasesGenerated => "phases_generated",
            PlanStatus::PhasesApproved => "phases_approved",
            PlanStatus::TasksGenerated => "tasks_generated",
            PlanStatus::TasksApproved => "tasks_approved",
            PlanStatus::Implementing => "implementing",
            PlanStatus::Complete => "complete",
            PlanStatus::Archived => "archived",
            PlanStatus::Rejected => "rejected",
        }
    }

    /// The stage directly after this one, if any.
    pub fn next(&self) -> Option<PlanStatus> {
        match self {
            PlanStatus::Created => Some(PlanStatus::Drafted),
            PlanStatus::Drafted => Some(PlanStatus::Reviewed),
            PlanStatus::Reviewed => Some(PlanStatus::Approved),
            PlanStatus::Approved => Some(PlanStatus::PhasesGenerated),
            PlanStatus::PhasesGenerated => Some(PlanStatus::PhasesApproved),
            PlanStatus::PhasesApproved => Some(PlanStatus::TasksGenerated),
            PlanStatus::TasksGenerated => Some(PlanStatus::TasksApproved),
            PlanStatus::TasksApproved => Some(PlanStatus::Implementing),
            PlanStatus::Implementing => Some(PlanStatus::Complete),
            PlanStatus::Complete => Some(PlanStatus::Archived),
            PlanStatus::Archived | PlanStatus::Rejected => None,
        }
    }

    /// Whether `target` is a legal next status. Stages advance one at a time;
    /// `rejected` is reachable only before approval.
    pub fn can_transition_to(&self, target: PlanStatus) -> bool {
        if target == PlanStatus::Rejected {
            return matches!(
                self,
                PlanStatus::Created | PlanStatus::Drafted | PlanStatus::Reviewed
            );
        }
        self.next() == Some(target)
    }

    /// Whether this status freezes the plan against edits and deletion.
    pub fn is_frozen(&self) -> bool {
        matches!(
            self,
            PlanStatus::Implementing | PlanStatus::Complete | PlanStatus::Archived
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Archived | PlanStatus::Rejected)
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        PlanStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Invalid plan status: {s}"))
    }
}

/// Execution and approval status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet submitted or started
    #[default]
    Pending,

    /// Submitted and waiting for a reviewer
    PendingApproval,

    /// Accepted by a reviewer, ready to start
    Approved,

    /// Sent back by a reviewer with a reason
    Rejected,

    /// Being worked on
    InProgress,

    /// Finished successfully
    Completed,

    /// Finished unsuccessfully
    Failed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Pending,
        TaskStatus::PendingApproval,
        TaskStatus::Approved,
        TaskStatus::Rejected,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::PendingApproval => "pending_approval",
            TaskStatus::Approved => "approved",
            TaskStatus::Rejected => "rejected",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Whether `target` is an edge of the task state machine.
    ///
    /// `pending → in_progress` is included; it lets callers that never use
    /// the approval workflow start work directly. See
    /// [`TaskStatus::is_approval_bypass`].
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, target),
            (Pending, PendingApproval)
                | (Pending, InProgress)
                | (PendingApproval, Approved)
                | (PendingApproval, Rejected)
                | (Rejected, PendingApproval)
                | (Approved, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
        )
    }

    /// Statuses entered only through submit, approve, reject and resubmit,
    /// which record the approver or the rejection reason.
    pub fn is_approval_owned(&self) -> bool {
        matches!(
            self,
            TaskStatus::PendingApproval | TaskStatus::Approved | TaskStatus::Rejected
        )
    }

    /// True for the edge that starts work without an approval.
    pub fn is_approval_bypass(&self, target: TaskStatus) -> bool {
        *self == TaskStatus::Pending && target == TaskStatus::InProgress
    }

    /// `completed` and `failed` have no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// True once execution has begun; such tasks are frozen against edits
    /// and deletion.
    pub fn is_started(&self) -> bool {
        matches!(
            self,
            TaskStatus::InProgress | TaskStatus::Completed | TaskStatus::Failed
        )
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "inprogress" => return Ok(TaskStatus::InProgress),
            "pendingapproval" => return Ok(TaskStatus::PendingApproval),
            _ => {}
        }
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Invalid task status: {s}"))
    }
}

/// Execution status of a phase. Approval is tracked separately by the
/// phase's `requires_approval`/`approved` flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    Active,
    Complete,
    Failed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::Active => "active",
            PhaseStatus::Complete => "complete",
            PhaseStatus::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, target: PhaseStatus) -> bool {
        matches!(
            (self, target),
            (PhaseStatus::Pending, PhaseStatus::Active)
                | (PhaseStatus::Active, PhaseStatus::Complete)
                | (PhaseStatus::Active, PhaseStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PhaseStatus::Complete | PhaseStatus::Failed)
    }

    /// Only phases that have not started may be edited or deleted.
    pub fn is_modifiable(&self) -> bool {
        *self == PhaseStatus::Pending
    }
}

impl FromStr for PhaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PhaseStatus::Pending),
            "active" => Ok(PhaseStatus::Active),
            "complete" | "completed" => Ok(PhaseStatus::Complete),
            "failed" => Ok(PhaseStatus::Failed),
            _ => Err(format!("Invalid phase status: {s}")),
        }
    }
}

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Implement,
    Test,
    Document,
    Review,
    Refactor,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Implement => "implement",
            TaskType::Test => "test",
            TaskType::Document => "document",
            TaskType::Review => "review",
            TaskType::Refactor => "refactor",
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "implement" => Ok(TaskType::Implement),
            "test" => Ok(TaskType::Test),
            "document" => Ok(TaskType::Document),
            "review" => Ok(TaskType::Review),
            "refactor" => Ok(TaskType::Refactor),
            _ => Err(format!("Invalid task type: {s}")),
        }
    }
}
