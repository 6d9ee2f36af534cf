//! Task and phase collection documents.

use super::{DocumentStore, PHASES_FILE, TASKS_FILE};
use crate::{
    error::Result,
    models::{Phase, Task},
    sequence,
};

impl DocumentStore {
    /// Loads every task of a plan in sequence order. A missing document
    /// yields an empty collection.
    pub async fn load_tasks(&self, slug: &str) -> Result<Vec<Task>> {
        let path = self.document_path(slug, TASKS_FILE)?;
        let mut tasks: Vec<Task> = Self::read_document(&path, "tasks").await?.unwrap_or_default();
        sequence::normalize(&mut tasks);
        Ok(tasks)
    }

    /// Replaces the tasks document of a plan.
    pub async fn save_tasks(&self, slug: &str, tasks: &[Task]) -> Result<()> {
        let path = self.document_path(slug, TASKS_FILE)?;
        Self::write_document(&path, tasks, "tasks").await
    }

    /// Loads every phase of a plan in sequence order. A missing document
    /// yields an empty collection.
    pub async fn load_phases(&self, slug: &str) -> Result<Vec<Phase>> {
        let path = self.document_path(slug, PHASES_FILE)?;
        let mut phases: Vec<Phase> = Self::read_document(&path, "phases").await?.unwrap_or_default();
        sequence::normalize(&mut phases);
        Ok(phases)
    }

    /// Replaces the phases document of a plan.
    pub async fn save_phases(&self, slug: &str, phases: &[Phase]) -> Result<()> {
        let path = self.document_path(slug, PHASES_FILE)?;
        Self::write_document(&path, phases, "phases").await
    }
}
