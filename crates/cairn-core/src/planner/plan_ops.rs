//! Plan operations for the Planner.

use jiff::Timestamp;
use tokio_util::sync::CancellationToken;

use super::{ensure_active, require_text, Planner};
use crate::{
    display::PlanSummaries,
    error::{Result, WorkflowError},
    models::{
        ListPlansResult, Milestone, Plan, PlanLoadFailure, PlanStatus, PlanSummary, Task,
        UpdatePlanRequest,
    },
    params::CreatePlan,
    slug::{canonicalize_slug, plan_id},
};

impl Planner {
    /// Creates a new plan with status `created` and no milestones.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PlanExists` if the slug is already taken.
    pub async fn create_plan(&self, params: &CreatePlan, ctx: &CancellationToken) -> Result<Plan> {
        let slug = canonicalize_slug(&params.slug)?;
        require_text(&params.title, || WorkflowError::TitleRequired)?;
        log::debug!("create_plan: slug={slug}");

        let _guard = self.lock_plan(&slug, ctx).await?;
        if self.store.plan_exists(&slug).await {
            return Err(WorkflowError::PlanExists { slug });
        }

        let plan = Plan {
            id: plan_id(&self.project, &slug),
            slug: slug.clone(),
            title: params.title.trim().to_string(),
            project: self.project.clone(),
            goal: params.goal.clone(),
            context: params.context.clone(),
            scope: params.scope.clone(),
            status: Some(PlanStatus::Created),
            approved: false,
            approved_at: None,
            review_verdict: String::new(),
            review_summary: String::new(),
            reviewed_at: None,
            phases_approved: false,
            phases_approved_at: None,
            tasks_approved: false,
            tasks_approved_at: None,
            created_at: Timestamp::now(),
            updated_at: None,
        };
        self.store.save_plan(&plan).await?;

        log::info!("created plan {}", plan.id);
        Ok(plan)
    }

    /// Retrieves a plan by slug.
    pub async fn get_plan(&self, slug: &str, ctx: &CancellationToken) -> Result<Plan> {
        self.begin_read(slug, ctx)?;
        self.store.load_plan(slug).await
    }

    /// Whether a plan document exists for `slug`.
    pub async fn plan_exists(&self, slug: &str, ctx: &CancellationToken) -> Result<bool> {
        self.begin_read(slug, ctx)?;
        Ok(self.store.plan_exists(slug).await)
    }

    /// Loads every plan of the project.
    ///
    /// A plan document that cannot be read or parsed does not abort the
    /// listing; it is reported in [`ListPlansResult::errors`] instead.
    pub async fn list_plans(&self, ctx: &CancellationToken) -> Result<ListPlansResult> {
        ensure_active(ctx)?;
        let mut result = ListPlansResult::default();

        for slug in self.store.list_plan_slugs().await? {
            ensure_active(ctx)?;
            match self.store.load_plan(&slug).await {
                Ok(plan) => result.plans.push(plan),
                Err(error) => {
                    log::warn!("failed to load plan {slug}: {error}");
                    result.errors.push(PlanLoadFailure { slug, error });
                }
            }
        }

        Ok(result)
    }

    /// Lists plans with task and phase progress counts.
    ///
    /// Plans whose documents fail to load are skipped with a warning.
    pub async fn list_plan_summaries(&self, ctx: &CancellationToken) -> Result<PlanSummaries> {
        let listing = self.list_plans(ctx).await?;
        self.summarize_plans(&listing.plans, ctx).await
    }

    /// Computes progress counts for already loaded plans. A plan whose task
    /// or phase document cannot be read is skipped with a warning.
    pub async fn summarize_plans(
        &self,
        plans: &[Plan],
        ctx: &CancellationToken,
    ) -> Result<PlanSummaries> {
        let mut summaries = Vec::with_capacity(plans.len());

        for plan in plans {
            ensure_active(ctx)?;
            let collections = async {
                let tasks = self.store.load_tasks(&plan.slug).await?;
                let phases = self.store.load_phases(&plan.slug).await?;
                Ok::<_, WorkflowError>((tasks, phases))
            };
            match collections.await {
                Ok((tasks, phases)) => {
                    summaries.push(PlanSummary::from_plan(plan, &tasks, &phases))
                }
                Err(error) => log::warn!("skipping summary of plan {}: {error}", plan.slug),
            }
        }

        Ok(PlanSummaries(summaries))
    }

    /// Edits the descriptive fields of a plan.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PlanNotUpdatable` once the plan is
    /// implementing, complete or archived, or once any of its tasks has
    /// started.
    pub async fn update_plan(
        &self,
        slug: &str,
        request: &UpdatePlanRequest,
        ctx: &CancellationToken,
    ) -> Result<Plan> {
        if let Some(title) = &request.title {
            require_text(title, || WorkflowError::TitleRequired)?;
        }
        log::debug!("update_plan: slug={slug}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut plan = self.store.load_plan(slug).await?;
        let tasks = self.store.load_tasks(slug).await?;
        if let Some(reason) = frozen_reason(&plan, &tasks) {
            return Err(WorkflowError::PlanNotUpdatable {
                slug: slug.to_string(),
                reason,
            });
        }
        if request.is_empty() {
            return Ok(plan);
        }

        if let Some(title) = &request.title {
            plan.title = title.trim().to_string();
        }
        if let Some(goal) = &request.goal {
            plan.goal = goal.clone();
        }
        if let Some(context) = &request.context {
            plan.context = context.clone();
        }
        if let Some(scope) = &request.scope {
            plan.scope = scope.clone();
        }
        plan.updated_at = Some(Timestamp::now());
        self.store.save_plan(&plan).await?;

        log::info!("updated plan {}", plan.id);
        Ok(plan)
    }

    /// Permanently deletes a plan with its phases and tasks. Returns the
    /// deleted plan.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PlanNotDeletable` under the same conditions
    /// that block [`Planner::update_plan`].
    pub async fn delete_plan(&self, slug: &str, ctx: &CancellationToken) -> Result<Plan> {
        log::debug!("delete_plan: slug={slug}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let plan = self.store.load_plan(slug).await?;
        let tasks = self.store.load_tasks(slug).await?;
        if let Some(reason) = frozen_reason(&plan, &tasks) {
            return Err(WorkflowError::PlanNotDeletable {
                slug: slug.to_string(),
                reason,
            });
        }
        self.store.remove_plan(slug).await?;

        log::info!("deleted plan {}", plan.id);
        Ok(plan)
    }

    /// Moves a plan to `target` along the plan state machine.
    ///
    /// The edge is checked from the plan's effective status. Entering
    /// `approved`, `phases_approved` or `tasks_approved` also sets the
    /// matching milestone flag and timestamp.
    pub async fn set_plan_status(
        &self,
        slug: &str,
        target: PlanStatus,
        ctx: &CancellationToken,
    ) -> Result<Plan> {
        log::debug!("set_plan_status: slug={slug} target={target}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut plan = self.store.load_plan(slug).await?;
        let current = plan.effective_status();
        if !current.can_transition_to(target) {
            return Err(WorkflowError::invalid_transition("plan", current, target));
        }

        let now = Timestamp::now();
        plan.status = Some(target);
        if let Some(milestone) = Plan::milestone_for(target) {
            plan.set_milestone(milestone, Some(now));
        }
        plan.updated_at = Some(now);
        self.store.save_plan(&plan).await?;

        log::info!("plan {} status {current} -> {target}", plan.id);
        Ok(plan)
    }

    /// Approves the plan itself, committing it for phase generation.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::AlreadyApproved` if the plan is already
    /// approved.
    pub async fn promote_plan(&self, slug: &str, ctx: &CancellationToken) -> Result<Plan> {
        self.approve_milestone(slug, Milestone::Plan, PlanStatus::Approved, ctx)
            .await
    }

    /// Approves the generated phases of a plan.
    pub async fn approve_phase_plan(&self, slug: &str, ctx: &CancellationToken) -> Result<Plan> {
        self.approve_milestone(slug, Milestone::Phases, PlanStatus::PhasesApproved, ctx)
            .await
    }

    /// Approves the generated tasks of a plan.
    pub async fn approve_task_plan(&self, slug: &str, ctx: &CancellationToken) -> Result<Plan> {
        self.approve_milestone(slug, Milestone::Tasks, PlanStatus::TasksApproved, ctx)
            .await
    }

    /// Stores a reviewer's verdict on the plan and advances it to
    /// `reviewed` when that edge exists from its effective status.
    pub async fn record_review(
        &self,
        slug: &str,
        verdict: &str,
        summary: &str,
        ctx: &CancellationToken,
    ) -> Result<Plan> {
        require_text(verdict, || {
            WorkflowError::invalid_input("verdict").with_reason("verdict is required")
        })?;
        log::debug!("record_review: slug={slug} verdict={verdict}");

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut plan = self.store.load_plan(slug).await?;
        let current = plan.effective_status();

        let now = Timestamp::now();
        plan.review_verdict = verdict.trim().to_string();
        plan.review_summary = summary.to_string();
        plan.reviewed_at = Some(now);
        plan.status = Some(if current.can_transition_to(PlanStatus::Reviewed) {
            PlanStatus::Reviewed
        } else {
            current
        });
        plan.updated_at = Some(now);
        self.store.save_plan(&plan).await?;

        log::info!("recorded review of plan {}: {}", plan.id, plan.review_verdict);
        Ok(plan)
    }

    async fn approve_milestone(
        &self,
        slug: &str,
        milestone: Milestone,
        status: PlanStatus,
        ctx: &CancellationToken,
    ) -> Result<Plan> {
        log::debug!("approve {} milestone: slug={slug}", milestone.as_str());

        let _guard = self.lock_plan(slug, ctx).await?;
        let mut plan = self.store.load_plan(slug).await?;
        if plan.milestone(milestone) {
            return Err(WorkflowError::AlreadyApproved {
                what: match milestone {
                    Milestone::Plan => format!("plan {slug}"),
                    other => format!("{} of plan {slug}", other.as_str()),
                },
            });
        }

        let current = plan.effective_status();
        if current.is_terminal() {
            return Err(WorkflowError::invalid_transition("plan", current, status));
        }

        let now = Timestamp::now();
        plan.set_milestone(milestone, Some(now));
        // Never move a plan backwards through its stages.
        plan.status = Some(if stage_index(current) < stage_index(status) {
            status
        } else {
            current
        });
        plan.updated_at = Some(now);
        self.store.save_plan(&plan).await?;

        log::info!("approved {} milestone of plan {}", milestone.as_str(), plan.id);
        Ok(plan)
    }
}

/// Why a plan is frozen against edits and deletion, if it is.
fn frozen_reason(plan: &Plan, tasks: &[Task]) -> Option<String> {
    let status = plan.effective_status();
    if status.is_frozen() {
        return Some(format!("plan status is {status}"));
    }
    tasks
        .iter()
        .find(|task| task.status.is_started())
        .map(|task| format!("task {} is {}", task.id, task.status))
}

fn stage_index(status: PlanStatus) -> usize {
    PlanStatus::ALL
        .iter()
        .position(|candidate| *candidate == status)
        .unwrap_or(usize::MAX)
}
