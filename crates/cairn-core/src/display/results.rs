//! Result wrapper types for displaying operation outcomes.
//!
//! Create, update and delete results share one layout per resource kind:
//! a confirmation line naming the resource, followed by its full display
//! where that is useful.

use std::fmt;

use crate::models::{Phase, Plan, Task};

/// A model that can be named in a confirmation line.
pub trait Resource: fmt::Display {
    /// Lowercase kind, e.g. `task`.
    const KIND: &'static str;

    fn resource_id(&self) -> &str;

    /// Short human label such as a title or name.
    fn label(&self) -> &str;
}

impl Resource for Plan {
    const KIND: &'static str = "plan";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Resource for Task {
    const KIND: &'static str = "task";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.description
    }
}

impl Resource for Phase {
    const KIND: &'static str = "phase";

    fn resource_id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Wrapper type for displaying the result of create operations.
///
/// # Examples
///
/// ```rust
/// use cairn_core::{display::CreateResult, models::{Task, TaskStatus, TaskType}};
/// use jiff::Timestamp;
///
/// let task = Task {
///     id: "task.auth.1".to_string(),
///     plan_id: "plan.auth".to_string(),
///     phase_id: None,
///     sequence: 1,
///     description: "Add login form".to_string(),
///     task_type: TaskType::Implement,
///     acceptance_criteria: vec![],
///     files: vec![],
///     depends_on: vec![],
///     status: TaskStatus::Pending,
///     approved_by: None,
///     approved_at: None,
///     rejection_reason: None,
///     started_at: None,
///     completed_at: None,
///     created_at: Timestamp::now(),
/// };
///
/// let output = CreateResult::new(task).to_string();
/// assert!(output.starts_with("Created task with ID: task.auth.1"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    /// Create a new CreateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl<T: Resource> fmt::Display for CreateResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created {} with ID: {}", T::KIND, self.resource.resource_id())?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, optionally
/// listing what changed.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    /// Create a new UpdateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    /// Create an UpdateResult with a list of changes made.
    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl<T: Resource> fmt::Display for UpdateResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated {} with ID: {}", T::KIND, self.resource.resource_id())?;

        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    /// Create a new DeleteResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl<T: Resource> fmt::Display for DeleteResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted {} '{}' (ID: {})",
            T::KIND,
            self.resource.label(),
            self.resource.resource_id()
        )
    }
}
