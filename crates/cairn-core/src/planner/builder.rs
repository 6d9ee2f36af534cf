//! Builder for creating and configuring Planner instances.

use std::path::{Path, PathBuf};

use tokio::fs;

use super::Planner;
use crate::{
    error::{FsResultExt, Result, WorkflowError},
    slug::{canonicalize_slug, DEFAULT_PROJECT},
    store::DocumentStore,
};

/// Builder for creating and configuring Planner instances.
#[derive(Debug, Clone)]
pub struct PlannerBuilder {
    data_dir: Option<PathBuf>,
    project: Option<String>,
    allow_approval_bypass: bool,
}

impl PlannerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            data_dir: None,
            project: None,
            allow_approval_bypass: true,
        }
    }

    /// Sets the storage root.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/cairn/projects/{project}` or
    /// `~/.local/share/cairn/projects/{project}`.
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the project slug. The default project yields unscoped plan IDs
    /// of the form `plan.{slug}`.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Controls whether tasks may go from `pending` straight to
    /// `in_progress` without being approved. Enabled by default.
    pub fn with_approval_bypass(mut self, allow: bool) -> Self {
        self.allow_approval_bypass = allow;
        self
    }

    /// Builds the configured planner instance.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidSlug` if the project slug is invalid
    /// Returns `WorkflowError::XdgDirectory` if no default location exists
    /// Returns `WorkflowError::FileSystem` if the storage root cannot be created
    pub async fn build(self) -> Result<Planner> {
        let project = match self.project {
            Some(project) => canonicalize_slug(&project)?,
            None => DEFAULT_PROJECT.to_string(),
        };

        let data_dir = match self.data_dir {
            Some(path) => path,
            None => Self::default_data_dir(&project)?,
        };

        fs::create_dir_all(&data_dir)
            .await
            .fs_context("Failed to create data directory", &data_dir)?;

        log::debug!(
            "planner ready: project={project} data_dir={} approval_bypass={}",
            data_dir.display(),
            self.allow_approval_bypass
        );

        Ok(Planner::new(
            DocumentStore::new(data_dir),
            project,
            self.allow_approval_bypass,
        ))
    }

    /// Returns the default storage root following the XDG Base Directory
    /// specification.
    fn default_data_dir(project: &str) -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("cairn")
            .create_data_directory(Path::new("projects").join(project))
            .map_err(|e| WorkflowError::XdgDirectory(e.to_string()))
    }
}

impl Default for PlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
