//! Data models for plans, phases and tasks.
//!
//! All three entities of a plan are persisted as JSON documents owned by the
//! plan's slug. Display implementations live in [`crate::display::models`].
//!
//! ```rust
//! use cairn_core::models::{TaskStatus, PlanStatus};
//!
//! assert!(TaskStatus::PendingApproval.can_transition_to(TaskStatus::Approved));
//! assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
//! assert!(PlanStatus::Created.can_transition_to(PlanStatus::Drafted));
//! assert!(!PlanStatus::Created.can_transition_to(PlanStatus::Reviewed));
//! ```

pub mod phase;
pub mod plan;
pub mod requests;
pub mod status;
pub mod summary;
pub mod task;


pub use phase::{Phase, PhaseAgentConfig};
pub use plan::{Milestone, Plan, Scope};
pub use requests::{UpdatePhaseRequest, UpdatePlanRequest, UpdateTaskRequest};
pub use status::{PhaseStatus, PlanStatus, TaskStatus, TaskType};
pub use summary::{ListPlansResult, PlanLoadFailure, PlanSummary};
pub use task::{AcceptanceCriterion, Task};
