//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};

use super::PlanStatus;

/// File and directory boundaries for a plan, as glob patterns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scope {
    /// Paths in scope for this plan
    #[serde(default)]
    pub include: Vec<String>,

    /// Paths explicitly out of scope
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Protected paths that must not be modified
    #[serde(default)]
    pub do_not_touch: Vec<String>,
}

/// Boolean approval milestones carried on a plan, each paired with a
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// The plan document itself was approved
    Plan,
    /// The generated phases were approved
    Phases,
    /// The generated tasks were approved
    Tasks,
}

impl Milestone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Milestone::Plan => "plan",
            Milestone::Phases => "phases",
            Milestone::Tasks => "tasks",
        }
    }
}

/// The top-level unit of work.
///
/// Milestone flags (`approved`, `phases_approved`, `tasks_approved`) must
/// only be changed through [`Plan::set_milestone`], which keeps each flag and
/// its timestamp in agreement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Composite identifier (`plan.{project}.{slug}` or `plan.{slug}`)
    pub id: String,

    /// User-facing identifier, unique within the project
    pub slug: String,

    /// Human-readable title
    pub title: String,

    /// Project slug the plan belongs to
    #[serde(default)]
    pub project: String,

    /// What is being built or fixed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub goal: String,

    /// Current state and why the work matters
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    #[serde(default)]
    pub scope: Scope,

    /// Explicit lifecycle status. Absent on documents written before the
    /// status field existed; see [`Plan::effective_status`].
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_status_as_none"
    )]
    pub status: Option<PlanStatus>,

    #[serde(default)]
    pub approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<Timestamp>,

    /// Reviewer verdict, e.g. `approved` or `needs_changes`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub review_verdict: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub review_summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<Timestamp>,

    #[serde(default)]
    pub phases_approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases_approved_at: Option<Timestamp>,

    #[serde(default)]
    pub tasks_approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks_approved_at: Option<Timestamp>,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Plan {
    /// Status used for every decision about the plan.
    ///
    /// The explicit `status` wins when present. Otherwise the status is
    /// inferred from legacy flags in priority order: tasks approved, plan
    /// approved, review verdict recorded, goal and context both written,
    /// and finally `created`.
    pub fn effective_status(&self) -> PlanStatus {
        if let Some(status) = self.status {
            return status;
        }
        if self.tasks_approved {
            PlanStatus::TasksApproved
        } else if self.approved {
            PlanStatus::Approved
        } else if !self.review_verdict.is_empty() {
            PlanStatus::Reviewed
        } else if !self.goal.is_empty() && !self.context.is_empty() {
            PlanStatus::Drafted
        } else {
            PlanStatus::Created
        }
    }

    /// Whether the given milestone flag is set.
    pub fn milestone(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::Plan => self.approved,
            Milestone::Phases => self.phases_approved,
            Milestone::Tasks => self.tasks_approved,
        }
    }

    /// Sets (`Some(at)`) or clears (`None`) a milestone flag together with
    /// its timestamp.
    pub fn set_milestone(&mut self, milestone: Milestone, at: Option<Timestamp>) {
        let (flag, stamp) = match milestone {
            Milestone::Plan => (&mut self.approved, &mut self.approved_at),
            Milestone::Phases => (&mut self.phases_approved, &mut self.phases_approved_at),
            Milestone::Tasks => (&mut self.tasks_approved, &mut self.tasks_approved_at),
        };
        *flag = at.is_some();
        *stamp = at;
    }

    /// The milestone implied by entering `status`, if any.
    pub(crate) fn milestone_for(status: PlanStatus) -> Option<Milestone> {
        match status {
            PlanStatus::Approved => Some(Milestone::Plan),
            PlanStatus::PhasesApproved => Some(Milestone::Phases),
            PlanStatus::TasksApproved => Some(Milestone::Tasks),
            _ => None,
        }
    }
}

/// Legacy documents may carry `"status": ""`; treat it like an absent field.
fn empty_status_as_none<'de, D>(deserializer: D) -> Result<Option<PlanStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<PlanStatus>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
