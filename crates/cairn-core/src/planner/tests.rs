//! Tests for the planner module.

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::{
    models::{
        PhaseAgentConfig, PhaseStatus, PlanStatus, TaskStatus, TaskType, UpdatePhaseRequest,
        UpdatePlanRequest, UpdateTaskRequest,
    },
    params::{CreatePhase, CreatePlan, CreateTask},
};

const SLUG: &str = "auth-feature";

/// Helper function to create a test planner
async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let planner = PlannerBuilder::new()
        .with_data_dir(temp_dir.path())
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

/// Helper creating a planner with one plan and `tasks` tasks in it.
async fn planner_with_tasks(tasks: usize) -> (TempDir, Planner, CancellationToken) {
    let (temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner
        .create_plan(&plan_params(SLUG), &ctx)
        .await
        .expect("Failed to create plan");
    for n in 1..=tasks {
        planner
            .create_task(SLUG, &task_params(&format!("Task {n}")), &ctx)
            .await
            .expect("Failed to create task");
    }
    (temp_dir, planner, ctx)
}

fn plan_params(slug: &str) -> CreatePlan {
    CreatePlan {
        slug: slug.to_string(),
        title: "Authentication".to_string(),
        goal: "Users can log in".to_string(),
        context: "No auth exists yet".to_string(),
        ..Default::default()
    }
}

fn task_params(description: &str) -> CreateTask {
    CreateTask {
        description: description.to_string(),
        ..Default::default()
    }
}

fn phase_params(name: &str, requires_approval: bool) -> CreatePhase {
    CreatePhase {
        name: name.to_string(),
        requires_approval,
        ..Default::default()
    }
}

fn task_id(n: u32) -> String {
    crate::slug::task_id(SLUG, n)
}

fn phase_id(n: u32) -> String {
    crate::slug::phase_id(SLUG, n)
}

// Plans

#[tokio::test]
async fn test_create_plan() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();

    let plan = planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();
    assert_eq!(plan.id, "plan.auth-feature");
    assert_eq!(plan.status, Some(PlanStatus::Created));
    assert!(!plan.approved && !plan.phases_approved && !plan.tasks_approved);
    assert!(plan.approved_at.is_none());

    assert!(planner.plan_exists(SLUG, &ctx).await.unwrap());
    assert_eq!(planner.get_plan(SLUG, &ctx).await.unwrap(), plan);

    let err = planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PlanExists { .. }));
}

#[tokio::test]
async fn test_create_plan_validation() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();

    let mut params = plan_params(SLUG);
    params.title = "  ".to_string();
    let err = planner.create_plan(&params, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::TitleRequired));

    let err = planner.create_plan(&plan_params(""), &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::SlugRequired));

    let err = planner.create_plan(&plan_params("a/b"), &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidSlug { .. }));
}

#[tokio::test]
async fn test_project_scoped_plan_id() {
    let temp_dir = TempDir::new().unwrap();
    let planner = PlannerBuilder::new()
        .with_data_dir(temp_dir.path())
        .with_project("acme")
        .build()
        .await
        .unwrap();
    let ctx = CancellationToken::new();

    let plan = planner.create_plan(&plan_params("auth"), &ctx).await.unwrap();
    assert_eq!(plan.id, "plan.acme.auth");
    assert_eq!(plan.project, "acme");
}

#[tokio::test]
async fn test_list_plans_tolerates_broken_documents() {
    let (temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params("alpha"), &ctx).await.unwrap();
    planner.create_plan(&plan_params("beta"), &ctx).await.unwrap();

    let broken = temp_dir.path().join("plans/broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("plan.json"), "{ not json").unwrap();

    let result = planner.list_plans(&ctx).await.unwrap();
    let slugs: Vec<_> = result.plans.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["alpha", "beta"]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].slug, "broken");
    assert!(matches!(result.errors[0].error, WorkflowError::Parse { .. }));
    assert!(!result.is_complete());
}

#[tokio::test]
async fn test_list_plan_summaries() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(3).await;
    planner.submit_task(SLUG, &task_id(1), &ctx).await.unwrap();
    planner
        .create_phase(SLUG, &phase_params("Design", false), &ctx)
        .await
        .unwrap();

    let summaries = planner.list_plan_summaries(&ctx).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_tasks, 3);
    assert_eq!(summaries[0].awaiting_approval, 1);
    assert_eq!(summaries[0].total_phases, 1);
}

#[tokio::test]
async fn test_set_plan_status_follows_stage_order() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();

    let err = planner
        .set_plan_status(SLUG, PlanStatus::Reviewed, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition { entity: "plan", ref from, ref to }
            if from == "created" && to == "reviewed"
    ));

    for status in [PlanStatus::Drafted, PlanStatus::Reviewed] {
        planner.set_plan_status(SLUG, status, &ctx).await.unwrap();
    }
    let plan = planner
        .set_plan_status(SLUG, PlanStatus::Approved, &ctx)
        .await
        .unwrap();
    assert_eq!(plan.status, Some(PlanStatus::Approved));
    assert!(plan.approved);
    assert!(plan.approved_at.is_some());
    assert!(plan.updated_at.is_some());
}

#[tokio::test]
async fn test_plan_rejection_is_terminal() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();

    planner
        .set_plan_status(SLUG, PlanStatus::Rejected, &ctx)
        .await
        .unwrap();
    let err = planner.promote_plan(SLUG, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_promote_plan_once() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();

    let plan = planner.promote_plan(SLUG, &ctx).await.unwrap();
    assert!(plan.approved);
    assert!(plan.approved_at.is_some());
    assert_eq!(plan.status, Some(PlanStatus::Approved));

    let err = planner.promote_plan(SLUG, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyApproved { .. }));
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_milestones_never_move_status_backwards() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();

    let plan = planner.approve_task_plan(SLUG, &ctx).await.unwrap();
    assert!(plan.tasks_approved);
    assert_eq!(plan.status, Some(PlanStatus::TasksApproved));

    let plan = planner.approve_phase_plan(SLUG, &ctx).await.unwrap();
    assert!(plan.phases_approved);
    assert!(plan.phases_approved_at.is_some());
    assert_eq!(plan.status, Some(PlanStatus::TasksApproved));

    let err = planner.approve_phase_plan(SLUG, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyApproved { .. }));
}

#[tokio::test]
async fn test_record_review() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();

    // created cannot skip to reviewed; the verdict is still stored
    let plan = planner
        .record_review(SLUG, "needs_changes", "Scope is vague", &ctx)
        .await
        .unwrap();
    assert_eq!(plan.status, Some(PlanStatus::Created));
    assert_eq!(plan.review_verdict, "needs_changes");
    assert!(plan.reviewed_at.is_some());

    planner
        .set_plan_status(SLUG, PlanStatus::Drafted, &ctx)
        .await
        .unwrap();
    let plan = planner
        .record_review(SLUG, "approved", "", &ctx)
        .await
        .unwrap();
    assert_eq!(plan.status, Some(PlanStatus::Reviewed));

    let err = planner.record_review(SLUG, " ", "", &ctx).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_update_plan() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();

    let request = UpdatePlanRequest {
        title: Some("Auth v2".to_string()),
        goal: Some("SSO".to_string()),
        ..Default::default()
    };
    let plan = planner.update_plan(SLUG, &request, &ctx).await.unwrap();
    assert_eq!(plan.title, "Auth v2");
    assert_eq!(plan.goal, "SSO");
    assert_eq!(plan.context, "No auth exists yet");
    assert!(plan.updated_at.is_some());

    let request = UpdatePlanRequest {
        title: Some(String::new()),
        ..Default::default()
    };
    let err = planner.update_plan(SLUG, &request, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::TitleRequired));
}

#[tokio::test]
async fn test_plan_frozen_by_started_task() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(2).await;
    planner
        .update_task_status(SLUG, &task_id(2), TaskStatus::InProgress, &ctx)
        .await
        .unwrap();

    let err = planner
        .update_plan(SLUG, &UpdatePlanRequest::default(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotUpdatable { ref reason, .. } if reason.contains("task.auth-feature.2")));

    let err = planner.delete_plan(SLUG, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotDeletable { .. }));
    assert!(planner.plan_exists(SLUG, &ctx).await.unwrap());
}

#[tokio::test]
async fn test_plan_frozen_by_status() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();
    let mut plan = planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();
    plan.status = Some(PlanStatus::Implementing);
    planner.store.save_plan(&plan).await.unwrap();

    let err = planner.delete_plan(SLUG, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotDeletable { ref reason, .. } if reason.contains("implementing")));
}

#[tokio::test]
async fn test_delete_plan() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(2).await;

    let deleted = planner.delete_plan(SLUG, &ctx).await.unwrap();
    assert_eq!(deleted.slug, SLUG);
    assert!(!planner.plan_exists(SLUG, &ctx).await.unwrap());
    assert!(planner.list_tasks(SLUG, &ctx).await.unwrap().is_empty());

    let err = planner.get_plan(SLUG, &ctx).await.unwrap_err();
    assert!(err.is_not_found());
}

// Tasks

#[tokio::test]
async fn test_create_task() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(2).await;

    let params = CreateTask {
        description: "Write login tests".to_string(),
        task_type: TaskType::Test,
        depends_on: vec![task_id(1)],
        files: vec!["tests/login.rs".to_string()],
        ..Default::default()
    };
    let task = planner.create_task(SLUG, &params, &ctx).await.unwrap();
    assert_eq!(task.id, task_id(3));
    assert_eq!(task.sequence, 3);
    assert_eq!(task.plan_id, "plan.auth-feature");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.task_type, TaskType::Test);
    assert_eq!(task.depends_on, [task_id(1)]);

    assert_eq!(planner.get_task(SLUG, &task.id, &ctx).await.unwrap(), task);
}

#[tokio::test]
async fn test_create_task_validation() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;

    let err = planner
        .create_task(SLUG, &task_params(""), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::DescriptionRequired));

    let err = planner
        .create_task("missing", &task_params("Orphan"), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotFound { .. }));

    let params = CreateTask {
        description: "Depends on nothing real".to_string(),
        depends_on: vec![task_id(9)],
        ..Default::default()
    };
    let err = planner.create_task(SLUG, &params, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput { ref field, .. } if field == "depends_on"));

    let params = CreateTask {
        description: "In a missing phase".to_string(),
        phase_id: Some(phase_id(1)),
        ..Default::default()
    };
    let err = planner.create_task(SLUG, &params, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseNotFound { .. }));

    assert_eq!(planner.list_tasks(SLUG, &ctx).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_missing_task() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    let err = planner.get_task(SLUG, &task_id(5), &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::TaskNotFound { ref id } if id == "task.auth-feature.5"));
}

#[tokio::test]
async fn test_update_task() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(2).await;

    let request = UpdateTaskRequest {
        description: Some("Add login form with CSRF token".to_string()),
        task_type: Some(TaskType::Refactor),
        depends_on: Some(vec![task_id(1)]),
        ..Default::default()
    };
    let task = planner
        .update_task(SLUG, &task_id(2), &request, &ctx)
        .await
        .unwrap();
    assert_eq!(task.description, "Add login form with CSRF token");
    assert_eq!(task.task_type, TaskType::Refactor);
    assert_eq!(task.depends_on, [task_id(1)]);

    let request = UpdateTaskRequest {
        depends_on: Some(vec![task_id(2)]),
        ..Default::default()
    };
    let err = planner
        .update_task(SLUG, &task_id(2), &request, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput { ref reason, .. } if reason.contains("itself")));
}

#[tokio::test]
async fn test_started_task_is_not_modifiable() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    planner
        .update_task_status(SLUG, &task_id(1), TaskStatus::InProgress, &ctx)
        .await
        .unwrap();

    let request = UpdateTaskRequest {
        description: Some("Changed".to_string()),
        ..Default::default()
    };
    let err = planner
        .update_task(SLUG, &task_id(1), &request, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::TaskNotModifiable { ref status, .. } if status == "in_progress"));

    let err = planner.delete_task(SLUG, &task_id(1), &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::TaskNotModifiable { .. }));
}

#[tokio::test]
async fn test_delete_task_renumbers_and_cleans_dependencies() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(2).await;
    let params = CreateTask {
        description: "Task 3".to_string(),
        depends_on: vec![task_id(1), task_id(2)],
        ..Default::default()
    };
    planner.create_task(SLUG, &params, &ctx).await.unwrap();

    let deleted = planner.delete_task(SLUG, &task_id(1), &ctx).await.unwrap();
    assert_eq!(deleted.id, task_id(1));

    let tasks = planner.list_tasks(SLUG, &ctx).await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
    let sequences: Vec<_> = tasks.iter().map(|t| t.sequence).collect();
    assert_eq!(ids, [task_id(2), task_id(3)]);
    assert_eq!(sequences, [1, 2]);
    assert_eq!(tasks[1].depends_on, [task_id(2)]);
}

#[tokio::test]
async fn test_new_task_id_after_delete_does_not_collide() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(3).await;
    planner.delete_task(SLUG, &task_id(2), &ctx).await.unwrap();

    let task = planner
        .create_task(SLUG, &task_params("Task 4"), &ctx)
        .await
        .unwrap();
    assert_eq!(task.id, task_id(4));
    assert_eq!(task.sequence, 3);
}

#[tokio::test]
async fn test_task_execution_lifecycle() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    let id = task_id(1);

    let task = planner
        .update_task_status(SLUG, &id, TaskStatus::InProgress, &ctx)
        .await
        .unwrap();
    let started_at = task.started_at.expect("started_at is set");
    assert!(task.completed_at.is_none());

    let task = planner
        .update_task_status(SLUG, &id, TaskStatus::Completed, &ctx)
        .await
        .unwrap();
    assert_eq!(task.started_at, Some(started_at));
    assert!(task.completed_at.is_some());

    for target in TaskStatus::ALL {
        let err = planner
            .update_task_status(SLUG, &id, target, &ctx)
            .await
            .unwrap_err();
        assert!(
            matches!(err, WorkflowError::InvalidTransition { ref from, .. } if from == "completed"),
            "completed -> {target} must fail"
        );
    }
}

#[tokio::test]
async fn test_strict_approval_blocks_bypass() {
    let temp_dir = TempDir::new().unwrap();
    let planner = PlannerBuilder::new()
        .with_data_dir(temp_dir.path())
        .with_approval_bypass(false)
        .build()
        .await
        .unwrap();
    let ctx = CancellationToken::new();
    planner.create_plan(&plan_params(SLUG), &ctx).await.unwrap();
    planner
        .create_task(SLUG, &task_params("Task 1"), &ctx)
        .await
        .unwrap();
    let id = task_id(1);

    let err = planner
        .update_task_status(SLUG, &id, TaskStatus::InProgress, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    planner.submit_task(SLUG, &id, &ctx).await.unwrap();
    planner.approve_task(SLUG, &id, "lead", &ctx).await.unwrap();
    let task = planner
        .update_task_status(SLUG, &id, TaskStatus::InProgress, &ctx)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_status_update_leaves_approval_to_its_workflow() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(2).await;
    planner.submit_all_tasks(SLUG, &ctx).await.unwrap();

    for (n, target) in [(1, TaskStatus::Approved), (2, TaskStatus::Rejected)] {
        let err = planner
            .update_task_status(SLUG, &task_id(n), target, &ctx)
            .await
            .unwrap_err();
        assert!(
            matches!(err, WorkflowError::InvalidTransition { ref to, .. } if to == target.as_str()),
            "pending_approval -> {target} must go through the approval workflow"
        );
    }

    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    let err = planner
        .update_task_status(SLUG, &task_id(1), TaskStatus::PendingApproval, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));

    let tasks = planner.list_tasks(SLUG, &ctx).await.unwrap();
    assert_eq!(tasks[0].status, TaskStatus::Pending);

    planner.submit_task(SLUG, &task_id(1), &ctx).await.unwrap();
    let task = planner
        .approve_task(SLUG, &task_id(1), "lead", &ctx)
        .await
        .unwrap();
    assert_eq!(task.approved_by.as_deref(), Some("lead"));
    assert!(task.approved_at.is_some());
}

#[tokio::test]
async fn test_bulk_approval_requires_existing_plan() {
    let (_temp_dir, planner) = create_test_planner().await;
    let ctx = CancellationToken::new();

    let err = planner.submit_all_tasks("ghost", &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotFound { .. }));

    let err = planner
        .approve_all_tasks("ghost", "lead", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotFound { .. }));

    let err = planner
        .approve_all_phases("ghost", "lead", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PlanNotFound { .. }));
}

#[tokio::test]
async fn test_move_task_keeps_ids() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(4).await;

    let moved = planner.move_task(SLUG, &task_id(1), 3, &ctx).await.unwrap();
    assert_eq!(moved.id, task_id(1));
    assert_eq!(moved.sequence, 3);

    let tasks = planner.list_tasks(SLUG, &ctx).await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, [task_id(2), task_id(3), task_id(1), task_id(4)]);
    let sequences: Vec<_> = tasks.iter().map(|t| t.sequence).collect();
    assert_eq!(sequences, [1, 2, 3, 4]);

    let moved = planner.move_task(SLUG, &task_id(4), 0, &ctx).await.unwrap();
    assert_eq!(moved.sequence, 1);

    let err = planner.move_task(SLUG, &task_id(9), 1, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::TaskNotFound { .. }));
}

// Approval workflow

#[tokio::test]
async fn test_submit_all_skips_non_pending() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(3).await;
    planner.submit_task(SLUG, &task_id(1), &ctx).await.unwrap();

    assert_eq!(planner.submit_all_tasks(SLUG, &ctx).await.unwrap(), 2);
    assert_eq!(planner.submit_all_tasks(SLUG, &ctx).await.unwrap(), 0);

    let err = planner.submit_task(SLUG, &task_id(1), &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_approve_requires_pending_approval() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;

    let err = planner
        .approve_task(SLUG, &task_id(1), "lead", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotPendingApproval { ref status, .. } if status == "pending"));

    planner.submit_task(SLUG, &task_id(1), &ctx).await.unwrap();
    let err = planner
        .approve_task(SLUG, &task_id(1), "", &ctx)
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let task = planner
        .approve_task(SLUG, &task_id(1), "lead", &ctx)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Approved);
    assert_eq!(task.approved_by.as_deref(), Some("lead"));
    assert!(task.approved_at.is_some());
}

#[tokio::test]
async fn test_reject_requires_reason_and_pending_approval() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    let id = task_id(1);

    let err = planner.reject_task(SLUG, &id, "", &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::RejectionReasonRequired));

    let err = planner
        .reject_task(SLUG, &id, "too vague", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotPendingApproval { .. }));

    let err = planner.resubmit_task(SLUG, &id, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { ref to, .. } if to == "pending_approval"));
}

#[tokio::test]
async fn test_approval_round_trip() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    let id = task_id(1);
    planner.submit_task(SLUG, &id, &ctx).await.unwrap();

    let task = planner
        .reject_task(SLUG, &id, "needs detail", &ctx)
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Rejected);
    assert!(task.approved_by.is_none());

    let task = planner.resubmit_task(SLUG, &id, &ctx).await.unwrap();
    assert_eq!(task.status, TaskStatus::PendingApproval);
    assert_eq!(task.rejection_reason.as_deref(), Some("needs detail"));

    let task = planner.approve_task(SLUG, &id, "lead", &ctx).await.unwrap();
    assert_eq!(task.status, TaskStatus::Approved);
    assert_eq!(task.approved_by.as_deref(), Some("lead"));
    assert!(task.rejection_reason.is_none());
}

#[tokio::test]
async fn test_approve_all_tasks() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(3).await;
    planner.submit_task(SLUG, &task_id(1), &ctx).await.unwrap();
    planner.submit_task(SLUG, &task_id(3), &ctx).await.unwrap();

    let approved = planner.approve_all_tasks(SLUG, "lead", &ctx).await.unwrap();
    let ids: Vec<_> = approved.iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, [task_id(1), task_id(3)]);

    let task = planner.get_task(SLUG, &task_id(2), &ctx).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
}

// Phases

#[tokio::test]
async fn test_create_and_list_phases() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(0).await;

    let design = planner
        .create_phase(SLUG, &phase_params("Design", true), &ctx)
        .await
        .unwrap();
    assert_eq!(design.id, phase_id(1));
    assert_eq!(design.status, PhaseStatus::Pending);
    assert!(design.requires_approval && !design.approved);

    let params = CreatePhase {
        name: "Build".to_string(),
        depends_on: vec![phase_id(1)],
        agent_config: Some(PhaseAgentConfig(serde_json::json!({"model": "fast"}))),
        ..Default::default()
    };
    let build = planner.create_phase(SLUG, &params, &ctx).await.unwrap();
    assert_eq!(build.sequence, 2);

    let phases = planner.list_phases(SLUG, &ctx).await.unwrap();
    assert_eq!(phases.len(), 2);
    assert_eq!(planner.get_phase(SLUG, &phase_id(2), &ctx).await.unwrap(), build);

    let err = planner
        .create_phase(SLUG, &phase_params(" ", false), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseNameRequired));

    let params = CreatePhase {
        name: "Ship".to_string(),
        depends_on: vec![phase_id(7)],
        ..Default::default()
    };
    let err = planner.create_phase(SLUG, &params, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_phase_status_and_modification_guard() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(0).await;
    planner
        .create_phase(SLUG, &phase_params("Design", false), &ctx)
        .await
        .unwrap();
    let id = phase_id(1);

    let request = UpdatePhaseRequest {
        description: Some("Sketch the flows".to_string()),
        requires_approval: Some(true),
        ..Default::default()
    };
    let phase = planner.update_phase(SLUG, &id, &request, &ctx).await.unwrap();
    assert_eq!(phase.description, "Sketch the flows");
    assert!(phase.requires_approval);

    let err = planner
        .update_phase_status(SLUG, &id, PhaseStatus::Complete, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { entity: "phase", .. }));

    let phase = planner
        .update_phase_status(SLUG, &id, PhaseStatus::Active, &ctx)
        .await
        .unwrap();
    assert!(phase.started_at.is_some());

    let err = planner
        .update_phase(SLUG, &id, &request, &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseNotModifiable { ref status, .. } if status == "active"));
    let err = planner.delete_phase(SLUG, &id, &ctx).await.unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseNotModifiable { .. }));

    let phase = planner
        .update_phase_status(SLUG, &id, PhaseStatus::Failed, &ctx)
        .await
        .unwrap();
    assert!(phase.completed_at.is_some());
}

#[tokio::test]
async fn test_delete_phase_cleans_references() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(0).await;
    planner
        .create_phase(SLUG, &phase_params("Design", false), &ctx)
        .await
        .unwrap();
    let params = CreatePhase {
        name: "Build".to_string(),
        depends_on: vec![phase_id(1)],
        ..Default::default()
    };
    planner.create_phase(SLUG, &params, &ctx).await.unwrap();
    let params = CreateTask {
        description: "Draw wireframes".to_string(),
        phase_id: Some(phase_id(1)),
        ..Default::default()
    };
    planner.create_task(SLUG, &params, &ctx).await.unwrap();
    assert_eq!(
        planner
            .list_tasks_by_phase(SLUG, &phase_id(1), &ctx)
            .await
            .unwrap()
            .len(),
        1
    );

    planner.delete_phase(SLUG, &phase_id(1), &ctx).await.unwrap();

    let phases = planner.list_phases(SLUG, &ctx).await.unwrap();
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].id, phase_id(2));
    assert_eq!(phases[0].sequence, 1);
    assert!(phases[0].depends_on.is_empty());

    let task = planner.get_task(SLUG, &task_id(1), &ctx).await.unwrap();
    assert!(task.phase_id.is_none());

    let err = planner
        .list_tasks_by_phase(SLUG, &phase_id(1), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseNotFound { .. }));
}

#[tokio::test]
async fn test_phase_approval() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(0).await;
    planner
        .create_phase(SLUG, &phase_params("Design", false), &ctx)
        .await
        .unwrap();
    planner
        .create_phase(SLUG, &phase_params("Build", true), &ctx)
        .await
        .unwrap();
    planner
        .create_phase(SLUG, &phase_params("Ship", true), &ctx)
        .await
        .unwrap();

    let err = planner
        .approve_phase(SLUG, &phase_id(1), "lead", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotPendingApproval { .. }));

    let phase = planner
        .approve_phase(SLUG, &phase_id(2), "lead", &ctx)
        .await
        .unwrap();
    assert!(phase.approved);
    assert_eq!(phase.approved_by.as_deref(), Some("lead"));

    let err = planner
        .approve_phase(SLUG, &phase_id(2), "lead", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyApproved { .. }));

    let phase = planner
        .reject_phase(SLUG, &phase_id(2), "missing rollout plan", &ctx)
        .await
        .unwrap();
    assert!(!phase.approved);
    assert!(phase.approved_at.is_none());
    assert_eq!(phase.rejection_reason.as_deref(), Some("missing rollout plan"));

    let err = planner
        .reject_phase(SLUG, &phase_id(2), "", &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::RejectionReasonRequired));

    let approved = planner.approve_all_phases(SLUG, "lead", &ctx).await.unwrap();
    let ids: Vec<_> = approved.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, [phase_id(2), phase_id(3)]);
    assert!(approved[0].rejection_reason.is_none());

    assert!(planner
        .approve_all_phases(SLUG, "lead", &ctx)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_reorder_phases() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(0).await;
    for name in ["Design", "Build", "Ship"] {
        planner
            .create_phase(SLUG, &phase_params(name, false), &ctx)
            .await
            .unwrap();
    }

    let err = planner
        .reorder_phases(SLUG, &[phase_id(1), phase_id(2)], &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseOrderMismatch { expected: 3, actual: 2 }));

    let err = planner
        .reorder_phases(SLUG, &[phase_id(1), phase_id(2), phase_id(9)], &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::PhaseNotFound { .. }));

    let err = planner
        .reorder_phases(SLUG, &[phase_id(1), phase_id(1), phase_id(2)], &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidInput { .. }));

    let phases = planner
        .reorder_phases(SLUG, &[phase_id(3), phase_id(1), phase_id(2)], &ctx)
        .await
        .unwrap();
    let names: Vec<_> = phases.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Ship", "Design", "Build"]);
    let sequences: Vec<_> = phases.iter().map(|p| p.sequence).collect();
    assert_eq!(sequences, [1, 2, 3]);

    let moved = planner.move_phase(SLUG, &phase_id(3), 3, &ctx).await.unwrap();
    assert_eq!(moved.sequence, 3);
    let phases = planner.list_phases(SLUG, &ctx).await.unwrap();
    assert_eq!(phases[0].id, phase_id(1));
}

// Cancellation

#[tokio::test]
async fn test_cancelled_operations_do_nothing() {
    let (_temp_dir, planner, ctx) = planner_with_tasks(1).await;
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    let err = planner
        .create_task(SLUG, &task_params("Too late"), &cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Cancelled));

    let err = planner.submit_all_tasks(SLUG, &cancelled).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Cancelled));

    let err = planner.list_tasks(SLUG, &cancelled).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Cancelled));

    let tasks = planner.list_tasks(SLUG, &ctx).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_cancelled_while_waiting_for_lock() {
    let (_temp_dir, planner, _ctx) = planner_with_tasks(1).await;
    let ctx = CancellationToken::new();

    let id = task_id(1);
    let guard = planner.locks.acquire(SLUG).await;
    let waiting = planner.submit_task(SLUG, &id, &ctx);
    let cancel = async {
        tokio::task::yield_now().await;
        ctx.cancel();
        drop(guard);
    };
    let (result, ()) = tokio::join!(waiting, cancel);

    assert!(matches!(result, Err(WorkflowError::Cancelled)));
    let task = planner
        .get_task(SLUG, &task_id(1), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
}
