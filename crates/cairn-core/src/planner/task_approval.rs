//! Task approval workflow: submit, approve, reject and resubmit.
//!
//! ```text
//! pending ──submit──▶ pending_approval ──approve──▶ approved
//!                        ▲        │
//!                resubmit│        │reject
//!                        │        ▼
//!                        └──── rejected
//! ```

use jiff::Timestamp;
use tokio_util::sync::CancellationToken;

use super::{require_text, Planner};
use crate::{
    error::{Result, WorkflowError},
    models::{Task, TaskStatus},
};

impl Planner {
    /// Submits one `pending` task for approval.
    pub async fn submit_task(&self, slug: &str, id: &str, ctx: &CancellationToken) -> Result<Task> {
        log::debug!("submit_task: slug={slug} id={id}");

        let task = self
            .with_task(slug, id, ctx, |task, now| {
                if task.status != TaskStatus::Pending {
                    return Err(WorkflowError::invalid_transition(
                        "task",
                        task.status,
                        TaskStatus::PendingApproval,
                    ));
                }
                task.enter_status(TaskStatus::PendingApproval, now);
                Ok(())
            })
            .await?;

        log::info!("submitted task {id} in plan {slug} for approval");
        Ok(task)
    }

    /// Submits every `pending` task of a plan for approval. Tasks in any
    /// other status are left alone. Returns how many were submitted.
    pub async fn submit_all_tasks(&self, slug: &str, ctx: &CancellationToken) -> Result<usize> {
        log::debug!("submit_all_tasks: slug={slug}");

        let _guard = self.lock_plan(slug, ctx).await?;
        self.store.load_plan(slug).await?;
        let mut tasks = self.store.load_tasks(slug).await?;
        let now = Timestamp::now();

        let mut submitted = 0;
        for task in tasks.iter_mut().filter(|task| task.status == TaskStatus::Pending) {
            task.enter_status(TaskStatus::PendingApproval, now);
            submitted += 1;
        }
        if submitted > 0 {
            self.store.save_tasks(slug, &tasks).await?;
        }

        log::info!("submitted {submitted} tasks in plan {slug} for approval");
        Ok(submitted)
    }

    /// Approves a task awaiting approval and clears any earlier rejection.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotPendingApproval` unless the task is
    /// `pending_approval`.
    pub async fn approve_task(
        &self,
        slug: &str,
        id: &str,
        approved_by: &str,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        require_approver(approved_by)?;
        log::debug!("approve_task: slug={slug} id={id} by={approved_by}");

        let task = self
            .with_task(slug, id, ctx, |task, now| {
                ensure_pending_approval(task)?;
                task.approve(approved_by, now);
                Ok(())
            })
            .await?;

        log::info!("task {id} in plan {slug} approved by {approved_by}");
        Ok(task)
    }

    /// Approves every task of a plan that is awaiting approval. Returns the
    /// approved tasks.
    pub async fn approve_all_tasks(
        &self,
        slug: &str,
        approved_by: &str,
        ctx: &CancellationToken,
    ) -> Result<Vec<Task>> {
        require_approver(approved_by)?;
        log::debug!("approve_all_tasks: slug={slug} by={approved_by}");

        let _guard = self.lock_plan(slug, ctx).await?;
        self.store.load_plan(slug).await?;
        let mut tasks = self.store.load_tasks(slug).await?;
        let now = Timestamp::now();

        let mut approved = Vec::new();
        for task in tasks
            .iter_mut()
            .filter(|task| task.status == TaskStatus::PendingApproval)
        {
            task.approve(approved_by, now);
            approved.push(task.clone());
        }
        if !approved.is_empty() {
            self.store.save_tasks(slug, &tasks).await?;
        }

        log::info!("approved {} tasks in plan {slug}", approved.len());
        Ok(approved)
    }

    /// Rejects a task awaiting approval, storing the reason and clearing any
    /// approval fields.
    pub async fn reject_task(
        &self,
        slug: &str,
        id: &str,
        reason: &str,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        require_text(reason, || WorkflowError::RejectionReasonRequired)?;
        log::debug!("reject_task: slug={slug} id={id}");

        let task = self
            .with_task(slug, id, ctx, |task, now| {
                ensure_pending_approval(task)?;
                task.reject(reason.trim(), now);
                Ok(())
            })
            .await?;

        log::info!("task {id} in plan {slug} rejected");
        Ok(task)
    }

    /// Sends a rejected task back for approval. The rejection reason is kept
    /// until the task is approved.
    pub async fn resubmit_task(
        &self,
        slug: &str,
        id: &str,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        log::debug!("resubmit_task: slug={slug} id={id}");

        let task = self
            .with_task(slug, id, ctx, |task, now| {
                if task.status != TaskStatus::Rejected {
                    return Err(WorkflowError::invalid_transition(
                        "task",
                        task.status,
                        TaskStatus::PendingApproval,
                    ));
                }
                task.enter_status(TaskStatus::PendingApproval, now);
                task.clear_approval();
                Ok(())
            })
            .await?;

        log::info!("resubmitted task {id} in plan {slug}");
        Ok(task)
    }
}

fn require_approver(approved_by: &str) -> Result<()> {
    require_text(approved_by, || {
        WorkflowError::invalid_input("approved_by").with_reason("approver is required")
    })
}

fn ensure_pending_approval(task: &Task) -> Result<()> {
    if task.status != TaskStatus::PendingApproval {
        return Err(WorkflowError::NotPendingApproval {
            id: task.id.clone(),
            status: task.status.to_string(),
        });
    }
    Ok(())
}
