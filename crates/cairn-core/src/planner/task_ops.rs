//! Task operations for the Planner.

use jiff::Timestamp;
use tokio_util::sync::CancellationToken;

use super::{next_entity_number, require_text, Planner};
use crate::{
    error::{Result, WorkflowError},
    models::{Phase, Task, TaskStatus, UpdateTaskRequest},
    params::CreateTask,
    sequence::{self, find_invalid_dependency},
    slug::task_id,
};

impl Planner {
    /// Appends a new `pending` task to a plan.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PlanNotFound` if the plan does not exist,
    /// `WorkflowError::PhaseNotFound` for an unknown `phase_id`, and
    /// `WorkflowError::InvalidInput` for an unknown dependency.
    pub async fn create_task(
        &self,
        slug: &str,
        params: &CreateTask,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        require_text(&params.description, || WorkflowError::DescriptionRequired)?;
        log::debug!("create_task: slug={slug}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let plan = self.store.load_plan(slug).await?;
        let mut tasks = self.store.load_tasks(slug).await?;

        if let Some(phase_id) = &params.phase_id {
            let phases = self.store.load_phases(slug).await?;
            ensure_phase_exists(&phases, phase_id)?;
        }
        check_dependencies(&tasks, None, &params.depends_on)?;

        let task = Task {
            id: task_id(slug, next_entity_number(&tasks)),
            plan_id: plan.id,
            phase_id: params.phase_id.clone(),
            sequence: tasks.len() as u32 + 1,
            description: params.description.trim().to_string(),
            task_type: params.task_type,
            acceptance_criteria: params.acceptance_criteria.clone(),
            files: params.files.clone(),
            depends_on: params.depends_on.clone(),
            status: TaskStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            started_at: None,
            completed_at: None,
            created_at: Timestamp::now(),
        };
        tasks.push(task.clone());
        self.store.save_tasks(slug, &tasks).await?;

        log::info!("created task {} in plan {slug}", task.id);
        Ok(task)
    }

    /// Retrieves one task by ID.
    pub async fn get_task(&self, slug: &str, id: &str, ctx: &CancellationToken) -> Result<Task> {
        self.begin_read(slug, ctx)?;
        let tasks = self.store.load_tasks(slug).await?;
        tasks
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| task_not_found(id))
    }

    /// Every task of a plan in sequence order.
    pub async fn list_tasks(&self, slug: &str, ctx: &CancellationToken) -> Result<Vec<Task>> {
        self.begin_read(slug, ctx)?;
        self.store.load_tasks(slug).await
    }

    /// Tasks assigned to one phase, in sequence order.
    pub async fn list_tasks_by_phase(
        &self,
        slug: &str,
        phase_id: &str,
        ctx: &CancellationToken,
    ) -> Result<Vec<Task>> {
        self.begin_read(slug, ctx)?;
        let phases = self.store.load_phases(slug).await?;
        ensure_phase_exists(&phases, phase_id)?;

        let tasks = self.store.load_tasks(slug).await?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.phase_id.as_deref() == Some(phase_id))
            .collect())
    }

    /// Edits a task that has not started executing.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::TaskNotModifiable` once the task is
    /// `in_progress`, `completed` or `failed`.
    pub async fn update_task(
        &self,
        slug: &str,
        id: &str,
        request: &UpdateTaskRequest,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        if let Some(description) = &request.description {
            require_text(description, || WorkflowError::DescriptionRequired)?;
        }
        log::debug!("update_task: slug={slug} id={id}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut tasks = self.store.load_tasks(slug).await?;
        let index = task_index(&tasks, id)?;
        ensure_task_modifiable(&tasks[index])?;

        if let Some(Some(phase_id)) = &request.phase_id {
            let phases = self.store.load_phases(slug).await?;
            ensure_phase_exists(&phases, phase_id)?;
        }
        if let Some(depends_on) = &request.depends_on {
            check_dependencies(&tasks, Some(id), depends_on)?;
        }

        let task = &mut tasks[index];
        if let Some(description) = &request.description {
            task.description = description.trim().to_string();
        }
        if let Some(task_type) = request.task_type {
            task.task_type = task_type;
        }
        if let Some(phase_id) = &request.phase_id {
            task.phase_id = phase_id.clone();
        }
        if let Some(criteria) = &request.acceptance_criteria {
            task.acceptance_criteria = criteria.clone();
        }
        if let Some(files) = &request.files {
            task.files = files.clone();
        }
        if let Some(depends_on) = &request.depends_on {
            task.depends_on = depends_on.clone();
        }
        let updated = task.clone();
        self.store.save_tasks(slug, &tasks).await?;

        log::info!("updated task {id} in plan {slug}");
        Ok(updated)
    }

    /// Deletes a task that has not started executing.
    ///
    /// Remaining tasks are renumbered to a contiguous sequence and the deleted
    /// ID is dropped from every dependency list. Returns the deleted task.
    pub async fn delete_task(&self, slug: &str, id: &str, ctx: &CancellationToken) -> Result<Task> {
        log::debug!("delete_task: slug={slug} id={id}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut tasks = self.store.load_tasks(slug).await?;
        let index = task_index(&tasks, id)?;
        ensure_task_modifiable(&tasks[index])?;

        let removed = sequence::remove_and_cleanup(&mut tasks, id).ok_or_else(|| task_not_found(id))?;
        self.store.save_tasks(slug, &tasks).await?;

        log::info!("deleted task {id} from plan {slug}, {} remain", tasks.len());
        Ok(removed)
    }

    /// Moves a task along the task state machine.
    ///
    /// `pending → in_progress` is only accepted when the planner was built
    /// with the approval bypass enabled. `pending_approval`, `approved` and
    /// `rejected` are refused here; use the approval workflow instead.
    pub async fn update_task_status(
        &self,
        slug: &str,
        id: &str,
        target: TaskStatus,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        log::debug!("update_task_status: slug={slug} id={id} target={target}");
        let allow_bypass = self.allow_approval_bypass;

        let task = self
            .with_task(slug, id, ctx, |task, now| {
                let current = task.status;
                let bypass_denied = current.is_approval_bypass(target) && !allow_bypass;
                let allowed = current.can_transition_to(target) && !target.is_approval_owned();
                if !allowed || bypass_denied {
                    return Err(WorkflowError::invalid_transition("task", current, target));
                }
                task.enter_status(target, now);
                Ok(())
            })
            .await?;

        log::info!("task {id} in plan {slug} is now {target}");
        Ok(task)
    }

    /// Moves a task to 1-based `position`, clamped to the collection.
    ///
    /// Only `sequence` fields change; IDs are stable. Returns the moved task.
    pub async fn move_task(
        &self,
        slug: &str,
        id: &str,
        position: usize,
        ctx: &CancellationToken,
    ) -> Result<Task> {
        log::debug!("move_task: slug={slug} id={id} position={position}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut tasks = self.store.load_tasks(slug).await?;
        let from = task_index(&tasks, id)? + 1;

        if sequence::move_to_position(&mut tasks, from, position) {
            self.store.save_tasks(slug, &tasks).await?;
            log::info!("moved task {id} in plan {slug} from {from} to {position}");
        }

        tasks
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| task_not_found(id))
    }

    /// Locks the plan, applies `mutate` to one task and persists the whole
    /// collection. Nothing is written if `mutate` fails.
    pub(crate) async fn with_task<F>(
        &self,
        slug: &str,
        id: &str,
        ctx: &CancellationToken,
        mutate: F,
    ) -> Result<Task>
    where
        F: FnOnce(&mut Task, Timestamp) -> Result<()>,
    {
        let _guard = self.lock_plan(slug, ctx).await?;
        let mut tasks = self.store.load_tasks(slug).await?;
        let index = task_index(&tasks, id)?;

        mutate(&mut tasks[index], Timestamp::now())?;
        let updated = tasks[index].clone();
        self.store.save_tasks(slug, &tasks).await?;
        Ok(updated)
    }
}

fn task_not_found(id: &str) -> WorkflowError {
    WorkflowError::TaskNotFound { id: id.to_string() }
}

fn task_index(tasks: &[Task], id: &str) -> Result<usize> {
    sequence::position_of(tasks, id).ok_or_else(|| task_not_found(id))
}

fn ensure_task_modifiable(task: &Task) -> Result<()> {
    if task.status.is_started() {
        return Err(WorkflowError::TaskNotModifiable {
            id: task.id.clone(),
            status: task.status.to_string(),
        });
    }
    Ok(())
}

fn ensure_phase_exists(phases: &[Phase], phase_id: &str) -> Result<()> {
    if sequence::position_of(phases, phase_id).is_none() {
        return Err(WorkflowError::PhaseNotFound {
            id: phase_id.to_string(),
        });
    }
    Ok(())
}

fn check_dependencies(tasks: &[Task], self_id: Option<&str>, depends_on: &[String]) -> Result<()> {
    match find_invalid_dependency(tasks, self_id, depends_on) {
        Some(dep) if Some(dep) == self_id => Err(WorkflowError::invalid_input("depends_on")
            .with_reason(format!("task {dep} cannot depend on itself"))),
        Some(dep) => Err(WorkflowError::invalid_input("depends_on")
            .with_reason(format!("unknown task {dep}"))),
        None => Ok(()),
    }
}
