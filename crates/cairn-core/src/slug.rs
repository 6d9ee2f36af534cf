//! Slug validation and composite identifier formatting.
//!
//! Slugs double as storage keys, so validation rejects anything that could
//! escape the plan directory in addition to enforcing the identifier
//! pattern.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{Result, WorkflowError};

/// Project slug that produces unscoped plan IDs (`plan.{slug}`).
pub const DEFAULT_PROJECT: &str = "default";

/// Lowercase alphanumeric with inner hyphens, 1-50 characters.
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,48}[a-z0-9])?$").expect("slug pattern is valid")
});

/// Checks that a slug is non-empty, pattern-conforming and free of path
/// separators.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(WorkflowError::SlugRequired);
    }
    if slug.contains("..") || slug.contains('/') || slug.contains('\\') {
        return Err(WorkflowError::InvalidSlug {
            slug: slug.to_string(),
        });
    }
    if !SLUG_PATTERN.is_match(slug) {
        return Err(WorkflowError::InvalidSlug {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Trims surrounding whitespace and lowercases a user-supplied slug, then
/// validates the result.
pub fn canonicalize_slug(raw: &str) -> Result<String> {
    let slug = raw.trim().to_lowercase();
    validate_slug(&slug)?;
    Ok(slug)
}

/// Formats a plan ID: `plan.{project}.{slug}`, or `plan.{slug}` for the
/// default project.
pub fn plan_id(project: &str, slug: &str) -> String {
    if project.is_empty() || project == DEFAULT_PROJECT {
        format!("plan.{slug}")
    } else {
        format!("plan.{project}.{slug}")
    }
}

/// Formats a task ID: `task.{slug}.{n}`.
pub fn task_id(slug: &str, n: u32) -> String {
    format!("task.{slug}.{n}")
}

/// Formats a phase ID: `phase.{slug}.{n}`.
pub fn phase_id(slug: &str, n: u32) -> String {
    format!("phase.{slug}.{n}")
}

/// Returns the numeric suffix of a composite ID such as `task.auth.3`.
pub(crate) fn id_number(id: &str) -> Option<u32> {
    id.rsplit_once('.').and_then(|(_, n)| n.parse().ok())
}
