//! Phase operations for the Planner.
//!
//! Phases carry two independent pieces of state: an execution status
//! (`pending → active → complete | failed`) and an approval flag that only
//! matters when `requires_approval` is set. Editing and deleting are only
//! allowed while a phase is `pending`.

use std::collections::HashSet;

use jiff::Timestamp;
use tokio_util::sync::CancellationToken;

use super::{next_entity_number, require_text, Planner};
use crate::{
    error::{Result, WorkflowError},
    models::{Phase, PhaseStatus, UpdatePhaseRequest},
    params::CreatePhase,
    sequence::{self, find_invalid_dependency},
    slug::phase_id,
};

impl Planner {
    /// Appends a new `pending` phase to a plan.
    pub async fn create_phase(
        &self,
        slug: &str,
        params: &CreatePhase,
        ctx: &CancellationToken,
    ) -> Result<Phase> {
        require_text(&params.name, || WorkflowError::PhaseNameRequired)?;
        log::debug!("create_phase: slug={slug} name={}", params.name);

        let _guard = self.lock_plan(slug, ctx).await?;
        let plan = self.store.load_plan(slug).await?;
        let mut phases = self.store.load_phases(slug).await?;
        check_dependencies(&phases, None, &params.depends_on)?;

        let phase = Phase {
            id: phase_id(slug, next_entity_number(&phases)),
            plan_id: plan.id,
            sequence: phases.len() as u32 + 1,
            name: params.name.trim().to_string(),
            description: params.description.clone(),
            depends_on: params.depends_on.clone(),
            status: PhaseStatus::Pending,
            requires_approval: params.requires_approval,
            approved: false,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            agent_config: params.agent_config.clone(),
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
        };
        phases.push(phase.clone());
        self.store.save_phases(slug, &phases).await?;

        log::info!("created phase {} in plan {slug}", phase.id);
        Ok(phase)
    }

    /// Retrieves one phase by ID.
    pub async fn get_phase(&self, slug: &str, id: &str, ctx: &CancellationToken) -> Result<Phase> {
        self.begin_read(slug, ctx)?;
        let phases = self.store.load_phases(slug).await?;
        phases
            .into_iter()
            .find(|phase| phase.id == id)
            .ok_or_else(|| phase_not_found(id))
    }

    /// Every phase of a plan in sequence order.
    pub async fn list_phases(&self, slug: &str, ctx: &CancellationToken) -> Result<Vec<Phase>> {
        self.begin_read(slug, ctx)?;
        self.store.load_phases(slug).await
    }

    /// Edits a `pending` phase.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PhaseNotModifiable` once the phase is
    /// `active`, `complete` or `failed`.
    pub async fn update_phase(
        &self,
        slug: &str,
        id: &str,
        request: &UpdatePhaseRequest,
        ctx: &CancellationToken,
    ) -> Result<Phase> {
        if let Some(name) = &request.name {
            require_text(name, || WorkflowError::PhaseNameRequired)?;
        }
        log::debug!("update_phase: slug={slug} id={id}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut phases = self.store.load_phases(slug).await?;
        let index = phase_index(&phases, id)?;
        ensure_phase_modifiable(&phases[index])?;
        if let Some(depends_on) = &request.depends_on {
            check_dependencies(&phases, Some(id), depends_on)?;
        }

        let phase = &mut phases[index];
        if let Some(name) = &request.name {
            phase.name = name.trim().to_string();
        }
        if let Some(description) = &request.description {
            phase.description = description.clone();
        }
        if let Some(depends_on) = &request.depends_on {
            phase.depends_on = depends_on.clone();
        }
        if let Some(requires_approval) = request.requires_approval {
            phase.requires_approval = requires_approval;
        }
        if let Some(agent_config) = &request.agent_config {
            phase.agent_config = Some(agent_config.clone());
        }
        let updated = phase.clone();
        self.store.save_phases(slug, &phases).await?;

        log::info!("updated phase {id} in plan {slug}");
        Ok(updated)
    }

    /// Deletes a `pending` phase.
    ///
    /// Remaining phases are renumbered, the ID is dropped from every phase
    /// dependency list, and tasks assigned to the phase become unassigned.
    /// Returns the deleted phase.
    pub async fn delete_phase(&self, slug: &str, id: &str, ctx: &CancellationToken) -> Result<Phase> {
        log::debug!("delete_phase: slug={slug} id={id}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut phases = self.store.load_phases(slug).await?;
        let index = phase_index(&phases, id)?;
        ensure_phase_modifiable(&phases[index])?;

        let removed =
            sequence::remove_and_cleanup(&mut phases, id).ok_or_else(|| phase_not_found(id))?;
        self.store.save_phases(slug, &phases).await?;

        let mut tasks = self.store.load_tasks(slug).await?;
        let mut unassigned = 0;
        for task in tasks
            .iter_mut()
            .filter(|task| task.phase_id.as_deref() == Some(id))
        {
            task.phase_id = None;
            unassigned += 1;
        }
        if unassigned > 0 {
            self.store.save_tasks(slug, &tasks).await?;
        }

        log::info!("deleted phase {id} from plan {slug}, unassigned {unassigned} tasks");
        Ok(removed)
    }

    /// Moves a phase along `pending → active → complete | failed`.
    pub async fn update_phase_status(
        &self,
        slug: &str,
        id: &str,
        target: PhaseStatus,
        ctx: &CancellationToken,
    ) -> Result<Phase> {
        log::debug!("update_phase_status: slug={slug} id={id} target={target}");

        let phase = self
            .with_phase(slug, id, ctx, |phase, now| {
                if !phase.status.can_transition_to(target) {
                    return Err(WorkflowError::invalid_transition(
                        "phase",
                        phase.status,
                        target,
                    ));
                }
                phase.enter_status(target, now);
                Ok(())
            })
            .await?;

        log::info!("phase {id} in plan {slug} is now {target}");
        Ok(phase)
    }

    /// Approves a phase that requires approval.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotPendingApproval` if the phase does not
    /// require approval and `WorkflowError::AlreadyApproved` if it has been
    /// approved already.
    pub async fn approve_phase(
        &self,
        slug: &str,
        id: &str,
        approved_by: &str,
        ctx: &CancellationToken,
    ) -> Result<Phase> {
        require_text(approved_by, || {
            WorkflowError::invalid_input("approved_by").with_reason("approver is required")
        })?;
        log::debug!("approve_phase: slug={slug} id={id} by={approved_by}");

        let phase = self
            .with_phase(slug, id, ctx, |phase, now| {
                if !phase.requires_approval {
                    return Err(WorkflowError::NotPendingApproval {
                        id: phase.id.clone(),
                        status: phase.status.to_string(),
                    });
                }
                if phase.approved {
                    return Err(WorkflowError::AlreadyApproved {
                        what: format!("phase {}", phase.id),
                    });
                }
                phase.approve(approved_by, now);
                Ok(())
            })
            .await?;

        log::info!("phase {id} in plan {slug} approved by {approved_by}");
        Ok(phase)
    }

    /// Rejects a phase, clearing any approval and storing the reason.
    pub async fn reject_phase(
        &self,
        slug: &str,
        id: &str,
        reason: &str,
        ctx: &CancellationToken,
    ) -> Result<Phase> {
        require_text(reason, || WorkflowError::RejectionReasonRequired)?;
        log::debug!("reject_phase: slug={slug} id={id}");

        let phase = self
            .with_phase(slug, id, ctx, |phase, _| {
                phase.reject(reason.trim());
                Ok(())
            })
            .await?;

        log::info!("phase {id} in plan {slug} rejected");
        Ok(phase)
    }

    /// Approves every phase that requires approval and is not yet approved.
    /// Returns the newly approved phases.
    pub async fn approve_all_phases(
        &self,
        slug: &str,
        approved_by: &str,
        ctx: &CancellationToken,
    ) -> Result<Vec<Phase>> {
        require_text(approved_by, || {
            WorkflowError::invalid_input("approved_by").with_reason("approver is required")
        })?;
        log::debug!("approve_all_phases: slug={slug} by={approved_by}");

        let _guard = self.lock_plan(slug, ctx).await?;
        self.store.load_plan(slug).await?;
        let mut phases = self.store.load_phases(slug).await?;
        let now = Timestamp::now();

        let mut approved = Vec::new();
        for phase in phases
            .iter_mut()
            .filter(|phase| phase.requires_approval && !phase.approved)
        {
            phase.approve(approved_by, now);
            approved.push(phase.clone());
        }
        if !approved.is_empty() {
            self.store.save_phases(slug, &phases).await?;
        }

        log::info!("approved {} phases in plan {slug}", approved.len());
        Ok(approved)
    }

    /// Moves a phase to 1-based `position`, clamped to the collection.
    /// Returns the moved phase.
    pub async fn move_phase(
        &self,
        slug: &str,
        id: &str,
        position: usize,
        ctx: &CancellationToken,
    ) -> Result<Phase> {
        log::debug!("move_phase: slug={slug} id={id} position={position}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut phases = self.store.load_phases(slug).await?;
        let from = phase_index(&phases, id)? + 1;

        if sequence::move_to_position(&mut phases, from, position) {
            self.store.save_phases(slug, &phases).await?;
            log::info!("moved phase {id} in plan {slug} from {from} to {position}");
        }

        phases
            .into_iter()
            .find(|phase| phase.id == id)
            .ok_or_else(|| phase_not_found(id))
    }

    /// Rewrites the phase order from a complete list of phase IDs.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PhaseOrderMismatch` if `ids` does not have one
    /// entry per phase, `WorkflowError::InvalidInput` for a repeated ID and
    /// `WorkflowError::PhaseNotFound` for an unknown one. Nothing is written
    /// on error.
    pub async fn reorder_phases(
        &self,
        slug: &str,
        ids: &[String],
        ctx: &CancellationToken,
    ) -> Result<Vec<Phase>> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(WorkflowError::invalid_input("phase_ids")
                .with_reason(format!("phase {duplicate} is listed more than once")));
        }
        log::debug!("reorder_phases: slug={slug} count={}", ids.len());

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut phases = self.store.load_phases(slug).await?;
        if ids.len() != phases.len() {
            return Err(WorkflowError::PhaseOrderMismatch {
                expected: phases.len(),
                actual: ids.len(),
            });
        }

        let mut reordered = Vec::with_capacity(phases.len());
        for id in ids {
            let index = phase_index(&phases, id)?;
            reordered.push(phases.swap_remove(index));
        }
        sequence::renumber(&mut reordered);
        self.store.save_phases(slug, &reordered).await?;

        log::info!("reordered {} phases in plan {slug}", reordered.len());
        Ok(reordered)
    }

    /// Locks the plan, applies `mutate` to one phase and persists the whole
    /// collection. Nothing is written if `mutate` fails.
    async fn with_phase<F>(
        &self,
        slug: &str,
        id: &str,
        ctx: &CancellationToken,
        mutate: F,
    ) -> Result<Phase>
    where
        F: FnOnce(&mut Phase, Timestamp) -> Result<()>,
    {
        let _guard = self.lock_plan(slug, ctx).await?;
        let mut phases = self.store.load_phases(slug).await?;
        let index = phase_index(&phases, id)?;

        mutate(&mut phases[index], Timestamp::now())?;
        let updated = phases[index].clone();
        self.store.save_phases(slug, &phases).await?;
        Ok(updated)
    }
}

fn phase_not_found(id: &str) -> WorkflowError {
    WorkflowError::PhaseNotFound { id: id.to_string() }
}

fn phase_index(phases: &[Phase], id: &str) -> Result<usize> {
    sequence::position_of(phases, id).ok_or_else(|| phase_not_found(id))
}

fn ensure_phase_modifiable(phase: &Phase) -> Result<()> {
    if !phase.status.is_modifiable() {
        return Err(WorkflowError::PhaseNotModifiable {
            id: phase.id.clone(),
            status: phase.status.to_string(),
        });
    }
    Ok(())
}

fn check_dependencies(
    phases: &[Phase],
    self_id: Option<&str>,
    depends_on: &[String],
) -> Result<()> {
    match find_invalid_dependency(phases, self_id, depends_on) {
        Some(dep) if Some(dep) == self_id => Err(WorkflowError::invalid_input("depends_on")
            .with_reason(format!("phase {dep} cannot depend on itself"))),
        Some(dep) => Err(WorkflowError::invalid_input("depends_on")
            .with_reason(format!("unknown phase {dep}"))),
        None => Ok(()),
    }
}
