//! High-level planner API for managing plans, phases and tasks.
//!
//! This module provides the main [`Planner`] interface. The planner owns the
//! document store and the per-plan lock table, and implements every
//! lifecycle operation on top of them.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Operations     │    │   LockTable     │    │  DocumentStore  │
//! │ (plan_ops,       │───▶│ (one mutex per  │───▶│ (plan.json,     │
//! │  task_ops, ...)  │    │  plan slug)     │    │  tasks.json...) │
//! └──────────────────┘    └─────────────────┘    └─────────────────┘
//!   State machines          Serialization          Persistence
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Planner`] instances with configuration
//! - [`plan_ops`]: Plan creation, review, promotion, status and guarded edits
//! - [`task_ops`]: Task CRUD, status transitions and reordering
//! - [`task_approval`]: Task submit/approve/reject/resubmit workflow
//! - [`phase_ops`]: Phase CRUD, approval and reordering
//!
//! ## Mutation discipline
//!
//! Every mutating operation runs the same sequence: validate inputs, check
//! for cancellation, acquire the plan's lock, check for cancellation again,
//! load, mutate in memory, persist, release. Operations on different plans
//! never wait on each other. Read-only operations validate and check for
//! cancellation but never take the lock.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use cairn_core::{PlannerBuilder, params::{CreatePlan, CreateTask}};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_data_dir("/tmp/cairn")
//!     .build()
//!     .await?;
//! let ctx = CancellationToken::new();
//!
//! planner
//!     .create_plan(
//!         &CreatePlan {
//!             slug: "auth-feature".to_string(),
//!             title: "Authentication".to_string(),
//!             ..Default::default()
//!         },
//!         &ctx,
//!     )
//!     .await?;
//!
//! let task = planner
//!     .create_task(
//!         "auth-feature",
//!         &CreateTask {
//!             description: "Add login form".to_string(),
//!             ..Default::default()
//!         },
//!         &ctx,
//!     )
//!     .await?;
//! planner.submit_task("auth-feature", &task.id, &ctx).await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{Result, WorkflowError},
    locks::LockTable,
    sequence::Sequenced,
    slug::{id_number, validate_slug},
    store::DocumentStore,
};

pub mod builder;
pub mod phase_ops;
pub mod plan_ops;
pub mod task_approval;
pub mod task_ops;

#[cfg(test)]
mod tests;

pub use builder::PlannerBuilder;

/// Main planner interface for managing plans, phases and tasks.
#[derive(Debug)]
pub struct Planner {
    pub(crate) store: DocumentStore,
    pub(crate) locks: LockTable,
    pub(crate) project: String,
    pub(crate) allow_approval_bypass: bool,
}

impl Planner {
    pub(crate) fn new(store: DocumentStore, project: String, allow_approval_bypass: bool) -> Self {
        Self {
            store,
            locks: LockTable::new(),
            project,
            allow_approval_bypass,
        }
    }

    /// Storage root this planner reads and writes.
    pub fn data_dir(&self) -> &Path {
        self.store.root()
    }

    /// Project slug that scopes plan IDs.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Whether `pending → in_progress` is accepted without an approval.
    pub fn allows_approval_bypass(&self) -> bool {
        self.allow_approval_bypass
    }

    /// Validates `slug`, then acquires its lock with a cancellation check on
    /// both sides of the wait.
    pub(crate) async fn lock_plan(
        &self,
        slug: &str,
        ctx: &CancellationToken,
    ) -> Result<OwnedMutexGuard<()>> {
        validate_slug(slug)?;
        ensure_active(ctx)?;
        let guard = self.locks.acquire(slug).await;
        ensure_active(ctx)?;
        Ok(guard)
    }

    /// Entry check for read-only operations.
    pub(crate) fn begin_read(&self, slug: &str, ctx: &CancellationToken) -> Result<()> {
        validate_slug(slug)?;
        ensure_active(ctx)
    }
}

/// Fails with [`WorkflowError::Cancelled`] once `ctx` has been cancelled.
pub(crate) fn ensure_active(ctx: &CancellationToken) -> Result<()> {
    if ctx.is_cancelled() {
        return Err(WorkflowError::Cancelled);
    }
    Ok(())
}

/// Number for the ID of a new entity appended to `items`.
///
/// Normally `N + 1`; after deletions the highest numeric suffix in use may be
/// larger, and reusing it would give two entities the same ID.
pub(crate) fn next_entity_number<T: Sequenced>(items: &[T]) -> u32 {
    let highest = items
        .iter()
        .filter_map(|item| id_number(item.id()))
        .max()
        .unwrap_or(0);
    (items.len() as u32 + 1).max(highest + 1)
}

/// Rejects blank required text.
pub(crate) fn require_text(value: &str, err: impl FnOnce() -> WorkflowError) -> Result<()> {
    if value.trim().is_empty() {
        return Err(err());
    }
    Ok(())
}
