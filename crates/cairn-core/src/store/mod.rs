//! JSON document persistence for plans, phases and tasks.
//!
//! Each plan owns three documents under `{root}/plans/{slug}/`:
//! `plan.json`, `phases.json` and `tasks.json`. Collections are always read
//! and written whole; an absent collection document reads as empty.
//!
//! Writes go to a sibling temporary file that is then renamed over the
//! target, so readers that do not hold the plan lock see either the old or
//! the new document, never a partially written one.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;

use crate::{
    error::{FsResultExt, Result, WorkflowError},
    slug::validate_slug,
};

pub mod collections;
pub mod plan_docs;

/// File name of the plan document.
pub const PLAN_FILE: &str = "plan.json";
/// File name of the phases document.
pub const PHASES_FILE: &str = "phases.json";
/// File name of the tasks document.
pub const TASKS_FILE: &str = "tasks.json";

const PLANS_DIR: &str = "plans";

/// Reads and writes the documents of every plan below a root directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn plans_dir(&self) -> PathBuf {
        self.root.join(PLANS_DIR)
    }

    /// Directory holding the documents of `slug`.
    pub(crate) fn plan_dir(&self, slug: &str) -> Result<PathBuf> {
        validate_slug(slug)?;
        Ok(self.plans_dir().join(slug))
    }

    fn document_path(&self, slug: &str, file: &str) -> Result<PathBuf> {
        Ok(self.plan_dir(slug)?.join(file))
    }

    /// Reads and parses a document; `Ok(None)` when the file does not exist.
    async fn read_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Option<T>> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).fs_context(&format!("Failed to read {what}"), path),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|source| WorkflowError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Serializes `value` as pretty JSON and atomically replaces `path`.
    async fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .fs_context("Failed to create plan directory", parent)?;
        }

        let data = serde_json::to_vec_pretty(value)?;
        let tmp_path = path.with_extension("json.tmp");

        fs::write(&tmp_path, &data)
            .await
            .fs_context(&format!("Failed to write {what}"), &tmp_path)?;
        fs::rename(&tmp_path, path)
            .await
            .fs_context(&format!("Failed to replace {what}"), path)?;

        log::trace!("wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}
