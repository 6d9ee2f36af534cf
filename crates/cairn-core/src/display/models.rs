//! Display implementations for domain models.
//!
//! These are kept apart from the model definitions. Statuses render as their
//! persisted snake_case names so error messages and markdown output agree
//! with the JSON documents.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    models::{
        AcceptanceCriterion, Phase, PhaseStatus, Plan, PlanStatus, PlanSummary, Scope, Task,
        TaskStatus, TaskType,
    },
    slug::DEFAULT_PROJECT,
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn task_icon(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "○",
        TaskStatus::PendingApproval => "?",
        TaskStatus::Approved => "●",
        TaskStatus::Rejected => "✗",
        TaskStatus::InProgress => "➤",
        TaskStatus::Completed => "✓",
        TaskStatus::Failed => "!",
    }
}

fn phase_icon(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Pending => "○",
        PhaseStatus::Active => "➤",
        PhaseStatus::Complete => "✓",
        PhaseStatus::Failed => "!",
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, label: &str, items: &[String]) -> fmt::Result {
    if !items.is_empty() {
        writeln!(f, "- {label}: {}", items.join(", "))?;
    }
    Ok(())
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, "Include", &self.include)?;
        write_list(f, "Exclude", &self.exclude)?;
        write_list(f, "Do not touch", &self.do_not_touch)
    }
}

impl fmt::Display for AcceptanceCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**Given** {}, **when** {}, **then** {}",
            self.given, self.when, self.then
        )
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} ({})", self.title, self.slug)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Status: {}", self.effective_status())?;
        if !self.project.is_empty() && self.project != DEFAULT_PROJECT {
            writeln!(f, "- Project: {}", self.project)?;
        }
        if let Some(at) = &self.approved_at {
            writeln!(f, "- Approved: {}", LocalDateTime(at))?;
        }
        if let Some(at) = &self.phases_approved_at {
            writeln!(f, "- Phases approved: {}", LocalDateTime(at))?;
        }
        if let Some(at) = &self.tasks_approved_at {
            writeln!(f, "- Tasks approved: {}", LocalDateTime(at))?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        if let Some(at) = &self.updated_at {
            writeln!(f, "- Updated: {}", LocalDateTime(at))?;
        }

        if !self.goal.is_empty() {
            writeln!(f, "\n## Goal\n")?;
            writeln!(f, "{}", self.goal)?;
        }
        if !self.context.is_empty() {
            writeln!(f, "\n## Context\n")?;
            writeln!(f, "{}", self.context)?;
        }
        if self.scope != Scope::default() {
            writeln!(f, "\n## Scope\n")?;
            write!(f, "{}", self.scope)?;
        }
        if !self.review_verdict.is_empty() {
            writeln!(f, "\n## Review\n")?;
            writeln!(f, "- Verdict: {}", self.review_verdict)?;
            if let Some(at) = &self.reviewed_at {
                writeln!(f, "- Reviewed: {}", LocalDateTime(at))?;
            }
            if !self.review_summary.is_empty() {
                writeln!(f)?;
                writeln!(f, "{}", self.review_summary)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({} {})",
            self.sequence,
            self.description,
            task_icon(self.status),
            self.status
        )?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Type: {}", self.task_type)?;
        if let Some(phase_id) = &self.phase_id {
            writeln!(f, "- Phase: {phase_id}")?;
        }
        write_list(f, "Depends on", &self.depends_on)?;
        if let (Some(by), Some(at)) = (&self.approved_by, &self.approved_at) {
            writeln!(f, "- Approved by {by} at {}", LocalDateTime(at))?;
        }
        if let Some(reason) = &self.rejection_reason {
            writeln!(f, "- Rejected: {reason}")?;
        }
        if let Some(at) = &self.started_at {
            writeln!(f, "- Started: {}", LocalDateTime(at))?;
        }
        if let Some(at) = &self.completed_at {
            writeln!(f, "- Finished: {}", LocalDateTime(at))?;
        }
        writeln!(f)?;

        if !self.acceptance_criteria.is_empty() {
            writeln!(f, "#### Acceptance")?;
            writeln!(f)?;
            for criterion in &self.acceptance_criteria {
                writeln!(f, "- {criterion}")?;
            }
            writeln!(f)?;
        }

        if !self.files.is_empty() {
            writeln!(f, "#### Files")?;
            writeln!(f)?;
            for file in &self.files {
                writeln!(f, "- `{file}`")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {}. {} ({} {})",
            self.sequence,
            self.name,
            phase_icon(self.status),
            self.status
        )?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        write_list(f, "Depends on", &self.depends_on)?;
        if self.requires_approval {
            match (&self.approved_by, &self.approved_at) {
                (Some(by), Some(at)) if self.approved => {
                    writeln!(f, "- Approved by {by} at {}", LocalDateTime(at))?
                }
                _ => writeln!(f, "- Awaiting approval")?,
            }
        }
        if let Some(reason) = &self.rejection_reason {
            writeln!(f, "- Rejected: {reason}")?;
        }
        if let Some(at) = &self.started_at {
            writeln!(f, "- Started: {}", LocalDateTime(at))?;
        }
        if let Some(at) = &self.completed_at {
            writeln!(f, "- Finished: {}", LocalDateTime(at))?;
        }

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = if self.total_tasks > 0 {
            format!(" ({}/{})", self.completed_tasks, self.total_tasks)
        } else {
            String::new()
        };

        writeln!(f, "## {} ({}){progress}", self.title, self.slug)?;
        writeln!(f)?;
        writeln!(f, "- **Status**: {}", self.status)?;
        if self.total_phases > 0 {
            writeln!(
                f,
                "- **Phases**: {}/{} complete",
                self.completed_phases, self.total_phases
            )?;
        }
        if self.awaiting_approval > 0 {
            writeln!(f, "- **Awaiting approval**: {}", self.awaiting_approval)?;
        }
        if self.failed_tasks > 0 {
            writeln!(f, "- **Failed**: {}", self.failed_tasks)?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;

        Ok(())
    }
}
