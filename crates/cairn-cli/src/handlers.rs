//! Command handlers: call the planner and render the outcome.

use anyhow::{bail, Result};
use cairn_core::{
    display::{CreateResult, DeleteResult, OperationStatus, Phases, Tasks, UpdateResult},
    CancellationToken, Planner, UpdatePhaseRequest, UpdatePlanRequest, UpdateTaskRequest,
};

use crate::{
    cli::{PhaseCommands, PlanCommands, TaskCommands},
    renderer::TerminalRenderer,
};

/// Runs one parsed command against a planner.
pub struct Cli {
    planner: Planner,
    renderer: TerminalRenderer,
    ctx: CancellationToken,
}

impl Cli {
    pub fn new(planner: Planner, renderer: TerminalRenderer, ctx: CancellationToken) -> Self {
        Self {
            planner,
            renderer,
            ctx,
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        let ctx = &self.ctx;
        match command {
            PlanCommands::Create(args) => {
                let plan = self.planner.create_plan(&args.into(), ctx).await?;
                self.renderer.render(&CreateResult::new(plan));
            }
            PlanCommands::List => self.list_plans().await?,
            PlanCommands::Show(args) => {
                let plan = self.planner.get_plan(&args.slug, ctx).await?;
                let phases = self.planner.list_phases(&args.slug, ctx).await?;
                let tasks = self.planner.list_tasks(&args.slug, ctx).await?;

                let mut output = plan.to_string();
                output.push_str("\n## Phases\n\n");
                output.push_str(&Phases(phases).to_string());
                output.push_str("\n## Tasks\n\n");
                output.push_str(&Tasks(tasks).to_string());
                self.renderer.render_markdown(&output);
            }
            PlanCommands::Update(args) => {
                let slug = args.slug.clone();
                let request = UpdatePlanRequest::from(args);
                let changes = plan_changes(&request);
                let plan = self.planner.update_plan(&slug, &request, ctx).await?;
                self.renderer.render(&UpdateResult::with_changes(plan, changes));
            }
            PlanCommands::Delete(args) => {
                if !args.confirm {
                    bail!(
                        "refusing to delete plan '{}' without --confirm",
                        args.slug
                    );
                }
                let plan = self.planner.delete_plan(&args.slug, ctx).await?;
                self.renderer.render(&DeleteResult::new(plan));
            }
            PlanCommands::Status(args) => {
                let plan = self
                    .planner
                    .set_plan_status(&args.slug, args.status, ctx)
                    .await?;
                let changes = vec![format!("status: {}", args.status)];
                self.renderer.render(&UpdateResult::with_changes(plan, changes));
            }
            PlanCommands::Review(args) => {
                let plan = self
                    .planner
                    .record_review(&args.slug, &args.verdict, &args.summary, ctx)
                    .await?;
                let changes = vec![format!("review: {}", plan.review_verdict)];
                self.renderer.render(&UpdateResult::with_changes(plan, changes));
            }
            PlanCommands::Promote(args) => {
                let plan = self.planner.promote_plan(&args.slug, ctx).await?;
                self.renderer
                    .render(&OperationStatus::success(format!("Approved plan {}", plan.id)));
            }
            PlanCommands::ApprovePhases(args) => {
                let plan = self.planner.approve_phase_plan(&args.slug, ctx).await?;
                self.renderer.render(&OperationStatus::success(format!(
                    "Approved phases of plan {}",
                    plan.id
                )));
            }
            PlanCommands::ApproveTasks(args) => {
                let plan = self.planner.approve_task_plan(&args.slug, ctx).await?;
                self.renderer.render(&OperationStatus::success(format!(
                    "Approved tasks of plan {}",
                    plan.id
                )));
            }
        }
        Ok(())
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        let ctx = &self.ctx;
        match command {
            TaskCommands::Add(args) => {
                let (slug, params) = args.into_params();
                let task = self.planner.create_task(&slug, &params, ctx).await?;
                self.renderer.render(&CreateResult::new(task));
            }
            TaskCommands::List(args) => {
                let tasks = match &args.phase {
                    Some(phase_id) => {
                        self.planner
                            .list_tasks_by_phase(&args.slug, phase_id, ctx)
                            .await?
                    }
                    None => self.planner.list_tasks(&args.slug, ctx).await?,
                };
                self.renderer.render(&Tasks(tasks));
            }
            TaskCommands::Show(args) => {
                let task = self.planner.get_task(&args.slug, &args.id, ctx).await?;
                self.renderer.render(&task);
            }
            TaskCommands::Update(args) => {
                let (slug, id) = (args.slug.clone(), args.id.clone());
                let request = UpdateTaskRequest::from(args);
                let changes = task_changes(&request);
                let task = self.planner.update_task(&slug, &id, &request, ctx).await?;
                self.renderer.render(&UpdateResult::with_changes(task, changes));
            }
            TaskCommands::Delete(args) => {
                let task = self.planner.delete_task(&args.slug, &args.id, ctx).await?;
                self.renderer.render(&DeleteResult::new(task));
            }
            TaskCommands::Status(args) => {
                let task = self
                    .planner
                    .update_task_status(&args.slug, &args.id, args.status, ctx)
                    .await?;
                let changes = vec![format!("status: {}", args.status)];
                self.renderer.render(&UpdateResult::with_changes(task, changes));
            }
            TaskCommands::Submit(args) => {
                let task = self.planner.submit_task(&args.slug, &args.id, ctx).await?;
                self.renderer.render(&UpdateResult::with_changes(
                    task,
                    vec!["status: pending_approval".to_string()],
                ));
            }
            TaskCommands::SubmitAll(args) => {
                let count = self.planner.submit_all_tasks(&args.slug, ctx).await?;
                self.renderer.render(&OperationStatus::success(format!(
                    "Submitted {count} tasks for approval"
                )));
            }
            TaskCommands::Approve(args) => {
                let task = self
                    .planner
                    .approve_task(&args.slug, &args.id, &args.by, ctx)
                    .await?;
                self.renderer.render(&UpdateResult::with_changes(
                    task,
                    vec![format!("approved by {}", args.by)],
                ));
            }
            TaskCommands::ApproveAll(args) => {
                let approved = self
                    .planner
                    .approve_all_tasks(&args.slug, &args.by, ctx)
                    .await?;
                self.renderer.render(&OperationStatus::success(format!(
                    "Approved {} tasks",
                    approved.len()
                )));
            }
            TaskCommands::Reject(args) => {
                let task = self
                    .planner
                    .reject_task(&args.slug, &args.id, &args.reason, ctx)
                    .await?;
                self.renderer.render(&UpdateResult::with_changes(
                    task,
                    vec!["status: rejected".to_string()],
                ));
            }
            TaskCommands::Resubmit(args) => {
                let task = self.planner.resubmit_task(&args.slug, &args.id, ctx).await?;
                self.renderer.render(&UpdateResult::with_changes(
                    task,
                    vec!["status: pending_approval".to_string()],
                ));
            }
            TaskCommands::Move(args) => {
                let task = self
                    .planner
                    .move_task(&args.slug, &args.id, args.position, ctx)
                    .await?;
                let changes = vec![format!("position: {}", task.sequence)];
                self.renderer.render(&UpdateResult::with_changes(task, changes));
            }
        }
        Ok(())
    }

    pub async fn handle_phase_command(&self, command: PhaseCommands) -> Result<()> {
        let ctx = &self.ctx;
        match command {
            PhaseCommands::Add(args) => {
                let (slug, params) = args.into_params();
                let phase = self.planner.create_phase(&slug, &params, ctx).await?;
                self.renderer.render(&CreateResult::new(phase));
            }
            PhaseCommands::List(args) => {
                let phases = self.planner.list_phases(&args.slug, ctx).await?;
                self.renderer.render(&Phases(phases));
            }
            PhaseCommands::Show(args) => {
                let phase = self.planner.get_phase(&args.slug, &args.id, ctx).await?;
                self.renderer.render(&phase);
            }
            PhaseCommands::Update(args) => {
                let (slug, id) = (args.slug.clone(), args.id.clone());
                let request = UpdatePhaseRequest::from(args);
                let changes = phase_changes(&request);
                let phase = self.planner.update_phase(&slug, &id, &request, ctx).await?;
                self.renderer.render(&UpdateResult::with_changes(phase, changes));
            }
            PhaseCommands::Delete(args) => {
                let phase = self.planner.delete_phase(&args.slug, &args.id, ctx).await?;
                self.renderer.render(&DeleteResult::new(phase));
            }
            PhaseCommands::Status(args) => {
                let phase = self
                    .planner
                    .update_phase_status(&args.slug, &args.id, args.status, ctx)
                    .await?;
                let changes = vec![format!("status: {}", args.status)];
                self.renderer.render(&UpdateResult::with_changes(phase, changes));
            }
            PhaseCommands::Approve(args) => {
                let phase = self
                    .planner
                    .approve_phase(&args.slug, &args.id, &args.by, ctx)
                    .await?;
                self.renderer.render(&UpdateResult::with_changes(
                    phase,
                    vec![format!("approved by {}", args.by)],
                ));
            }
            PhaseCommands::ApproveAll(args) => {
                let approved = self
                    .planner
                    .approve_all_phases(&args.slug, &args.by, ctx)
                    .await?;
                self.renderer.render(&OperationStatus::success(format!(
                    "Approved {} phases",
                    approved.len()
                )));
            }
            PhaseCommands::Reject(args) => {
                let phase = self
                    .planner
                    .reject_phase(&args.slug, &args.id, &args.reason, ctx)
                    .await?;
                self.renderer.render(&UpdateResult::with_changes(
                    phase,
                    vec!["approval withdrawn".to_string()],
                ));
            }
            PhaseCommands::Move(args) => {
                let phase = self
                    .planner
                    .move_phase(&args.slug, &args.id, args.position, ctx)
                    .await?;
                let changes = vec![format!("position: {}", phase.sequence)];
                self.renderer.render(&UpdateResult::with_changes(phase, changes));
            }
            PhaseCommands::Reorder(args) => {
                let phases = self
                    .planner
                    .reorder_phases(&args.slug, &args.ids, ctx)
                    .await?;
                self.renderer.render(&Phases(phases));
            }
        }
        Ok(())
    }

    /// Lists plan summaries. Also the default when no command is given.
    pub async fn list_plans(&self) -> Result<()> {
        let listing = self.planner.list_plans(&self.ctx).await?;
        let summaries = self.planner.summarize_plans(&listing.plans, &self.ctx).await?;
        self.renderer.render(&summaries);

        if !listing.is_complete() {
            let slugs: Vec<_> = listing
                .errors
                .iter()
                .map(|failure| failure.slug.as_str())
                .collect();
            self.renderer.render(&OperationStatus::failure(format!(
                "{} plan(s) failed to load: {}",
                slugs.len(),
                slugs.join(", ")
            )));
        }
        Ok(())
    }
}

fn plan_changes(request: &UpdatePlanRequest) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(title) = &request.title {
        changes.push(format!("title: {title}"));
    }
    if request.goal.is_some() {
        changes.push("goal".to_string());
    }
    if request.context.is_some() {
        changes.push("context".to_string());
    }
    changes
}

fn task_changes(request: &UpdateTaskRequest) -> Vec<String> {
    let mut changes = Vec::new();
    if request.description.is_some() {
        changes.push("description".to_string());
    }
    if let Some(task_type) = request.task_type {
        changes.push(format!("type: {task_type}"));
    }
    match &request.phase_id {
        Some(Some(phase_id)) => changes.push(format!("phase: {phase_id}")),
        Some(None) => changes.push("phase: none".to_string()),
        None => {}
    }
    if request.acceptance_criteria.is_some() {
        changes.push("acceptance criteria".to_string());
    }
    if request.files.is_some() {
        changes.push("files".to_string());
    }
    if let Some(depends_on) = &request.depends_on {
        changes.push(format!("depends on: {}", depends_on.join(", ")));
    }
    changes
}

fn phase_changes(request: &UpdatePhaseRequest) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(name) = &request.name {
        changes.push(format!("name: {name}"));
    }
    if request.description.is_some() {
        changes.push("description".to_string());
    }
    if let Some(depends_on) = &request.depends_on {
        changes.push(format!("depends on: {}", depends_on.join(", ")));
    }
    if let Some(requires_approval) = request.requires_approval {
        changes.push(format!("requires approval: {requires_approval}"));
    }
    changes
}
