//! Core library for cairn, a lifecycle engine for plans, phases and tasks.
//!
//! A plan is broken into ordered phases and ordered tasks. Tasks move through
//! an approval workflow (`pending → pending_approval → approved | rejected`)
//! and an execution state machine (`approved → in_progress → completed |
//! failed`). Every status change is checked against an explicit transition
//! table, sequences stay contiguous under reordering and deletion, and
//! dependency lists never reference entities that no longer exist.
//!
//! Each plan is stored as three JSON documents. Mutations on the same plan
//! are serialized by a per-plan lock; different plans never contend.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cairn_core::{
//!     params::{CreatePlan, CreateTask},
//!     PlannerBuilder,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new().with_data_dir("cairn-data").build().await?;
//! let ctx = CancellationToken::new();
//!
//! let plan = planner
//!     .create_plan(
//!         &CreatePlan {
//!             slug: "auth-feature".to_string(),
//!             title: "Authentication".to_string(),
//!             ..Default::default()
//!         },
//!         &ctx,
//!     )
//!     .await?;
//! println!("{plan}");
//!
//! for description in ["Add login form", "Hash passwords", "Add logout"] {
//!     let params = CreateTask {
//!         description: description.to_string(),
//!         ..Default::default()
//!     };
//!     planner.create_task("auth-feature", &params, &ctx).await?;
//! }
//!
//! let submitted = planner.submit_all_tasks("auth-feature", &ctx).await?;
//! assert_eq!(submitted, 3);
//! # Ok(())
//! # }
//! ```

pub mod display;
pub mod error;
pub mod locks;
pub mod models;
pub mod params;
pub mod planner;
pub mod sequence;
pub mod slug;
pub mod store;

pub use display::{
    CreateResult, DeleteResult, LocalDateTime, OperationStatus, Phases, PlanSummaries, Tasks,
    UpdateResult,
};
pub use error::{Result, WorkflowError};
pub use models::{
    AcceptanceCriterion, ListPlansResult, Phase, PhaseAgentConfig, PhaseStatus, Plan,
    PlanStatus, PlanSummary, Scope, Task, TaskStatus, TaskType, UpdatePhaseRequest,
    UpdatePlanRequest, UpdateTaskRequest,
};
pub use params::{CreatePhase, CreatePlan, CreateTask};
pub use planner::{Planner, PlannerBuilder};
pub use tokio_util::sync::CancellationToken;
