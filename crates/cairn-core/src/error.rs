//! Error types for the lifecycle engine.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Comprehensive error type for all workflow operations.
///
/// Variants fall into four groups: input validation, missing entities,
/// conflicts with the current state of an entity, and storage failures.
/// Use [`WorkflowError::is_validation`], [`WorkflowError::is_not_found`] and
/// [`WorkflowError::is_conflict`] to classify an error without matching on
/// its message.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A slug was empty
    #[error("slug is required")]
    SlugRequired,
    /// A slug failed the identifier pattern or contained path separators
    #[error("invalid slug '{slug}': must be lowercase alphanumeric with hyphens, no path separators")]
    InvalidSlug { slug: String },
    /// A plan title was empty
    #[error("title is required")]
    TitleRequired,
    /// A task description was empty
    #[error("description is required")]
    DescriptionRequired,
    /// A phase name was empty
    #[error("phase name is required")]
    PhaseNameRequired,
    /// A rejection was attempted without a reason
    #[error("rejection reason is required")]
    RejectionReasonRequired,
    /// Any other invalid argument
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// No plan document exists for the slug
    #[error("plan not found: {slug}")]
    PlanNotFound { slug: String },
    /// No task with the given ID exists in the plan
    #[error("task not found: {id}")]
    TaskNotFound { id: String },
    /// No phase with the given ID exists in the plan
    #[error("phase not found: {id}")]
    PhaseNotFound { id: String },

    /// A plan with the slug already exists
    #[error("plan already exists: {slug}")]
    PlanExists { slug: String },
    /// A milestone or entity was already approved
    #[error("{what} is already approved")]
    AlreadyApproved { what: String },
    /// The requested status change is not an edge of the state machine
    #[error("invalid {entity} status transition: cannot transition from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
    /// An approval-specific operation found the entity in the wrong state
    #[error("{id} is not pending approval (status: {status})")]
    NotPendingApproval { id: String, status: String },
    /// A task that has started executing cannot be edited or deleted
    #[error("task {id} cannot be modified with status {status}")]
    TaskNotModifiable { id: String, status: String },
    /// A phase that has started executing cannot be edited or deleted
    #[error("phase {id} cannot be modified with status {status}")]
    PhaseNotModifiable { id: String, status: String },
    /// The plan (or one of its tasks) has progressed too far to be edited
    #[error("plan {slug} cannot be updated: {reason}")]
    PlanNotUpdatable { slug: String, reason: String },
    /// The plan (or one of its tasks) has progressed too far to be deleted
    #[error("plan {slug} cannot be deleted: {reason}")]
    PlanNotDeletable { slug: String, reason: String },
    /// A full phase ordering did not cover every existing phase
    #[error("phase ID count ({actual}) does not match existing phase count ({expected})")]
    PhaseOrderMismatch { expected: usize, actual: usize },

    /// The caller cancelled the operation before it committed
    #[error("operation cancelled")]
    Cancelled,

    /// File system operation errors
    #[error("{context} at path '{path}': {source}")]
    FileSystem {
        context: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A persisted document could not be parsed
    #[error("malformed document '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> WorkflowError {
        WorkflowError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl WorkflowError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates an invalid transition error for the given entity kind.
    pub fn invalid_transition(
        entity: &'static str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// True for errors caused by malformed caller input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::SlugRequired
                | Self::InvalidSlug { .. }
                | Self::TitleRequired
                | Self::DescriptionRequired
                | Self::PhaseNameRequired
                | Self::RejectionReasonRequired
                | Self::InvalidInput { .. }
        )
    }

    /// True when the addressed plan, task or phase does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PlanNotFound { .. } | Self::TaskNotFound { .. } | Self::PhaseNotFound { .. }
        )
    }

    /// True for business-rule rejections based on current entity state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::PlanExists { .. }
                | Self::AlreadyApproved { .. }
                | Self::InvalidTransition { .. }
                | Self::NotPendingApproval { .. }
                | Self::TaskNotModifiable { .. }
                | Self::PhaseNotModifiable { .. }
                | Self::PlanNotUpdatable { .. }
                | Self::PlanNotDeletable { .. }
                | Self::PhaseOrderMismatch { .. }
        )
    }
}

/// Extension trait attaching storage context to I/O results.
pub trait FsResultExt<T> {
    /// Map an I/O error to [`WorkflowError::FileSystem`] with a message and
    /// the path that was being accessed.
    fn fs_context(self, context: &str, path: &Path) -> Result<T>;
}

impl<T> FsResultExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: &Path) -> Result<T> {
        self.map_err(|source| WorkflowError::FileSystem {
            context: context.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
