use cairn_core::{params::CreatePlan, CancellationToken, Planner, PlannerBuilder};
use tempfile::TempDir;

/// Helper function to create a test planner
pub async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let planner = PlannerBuilder::new()
        .with_data_dir(temp_dir.path())
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

/// Creates a plan with a title and goal under `slug`.
pub async fn create_plan(planner: &Planner, slug: &str) {
    planner
        .create_plan(
            &CreatePlan {
                slug: slug.to_string(),
                title: format!("Plan {slug}"),
                goal: "Ship it".to_string(),
                ..Default::default()
            },
            &CancellationToken::new(),
        )
        .await
        .expect("Failed to create plan");
}
