//! Plan document reads and writes.

use tokio::fs;

use super::{DocumentStore, PLAN_FILE};
use crate::{
    error::{FsResultExt, Result, WorkflowError},
    models::Plan,
};

impl DocumentStore {
    /// Loads the plan document for `slug`.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PlanNotFound` if no plan document exists.
    pub async fn load_plan(&self, slug: &str) -> Result<Plan> {
        let path = self.document_path(slug, PLAN_FILE)?;
        Self::read_document(&path, "plan")
            .await?
            .ok_or_else(|| WorkflowError::PlanNotFound {
                slug: slug.to_string(),
            })
    }

    /// Writes the plan document, creating the plan directory if needed.
    pub async fn save_plan(&self, plan: &Plan) -> Result<()> {
        let path = self.document_path(&plan.slug, PLAN_FILE)?;
        Self::write_document(&path, plan, "plan").await
    }

    /// Whether a plan document exists for `slug`. Invalid slugs never exist.
    pub async fn plan_exists(&self, slug: &str) -> bool {
        match self.document_path(slug, PLAN_FILE) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Deletes the plan directory and every document in it.
    pub async fn remove_plan(&self, slug: &str) -> Result<()> {
        let dir = self.plan_dir(slug)?;
        fs::remove_dir_all(&dir)
            .await
            .fs_context("Failed to remove plan directory", &dir)
    }

    /// Slugs of every plan directory, sorted. A missing root yields an empty
    /// list. Entries whose names are not valid slugs are skipped.
    pub async fn list_plan_slugs(&self) -> Result<Vec<String>> {
        let plans_dir = self.plans_dir();
        let mut entries = match fs::read_dir(&plans_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).fs_context("Failed to read plans directory", &plans_dir),
        };

        let mut slugs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .fs_context("Failed to read plans directory", &plans_dir)?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if crate::slug::validate_slug(name).is_ok() {
                    slugs.push(name.to_string());
                }
            }
        }

        slugs.sort();
        Ok(slugs)
    }
}
