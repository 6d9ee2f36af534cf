//! Phase model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::PhaseStatus;

/// Agent configuration attached to a phase. The engine stores it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PhaseAgentConfig(pub serde_json::Value);

/// An ordered grouping of tasks within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    /// Identifier assigned at creation (`phase.{slug}.{n}`); never changes
    pub id: String,

    pub plan_id: String,

    /// Position within the plan (1-based, contiguous)
    pub sequence: u32,

    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Phase IDs that must complete before this one starts
    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub status: PhaseStatus,

    #[serde(default)]
    pub requires_approval: bool,

    #[serde(default)]
    pub approved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_config: Option<PhaseAgentConfig>,

    pub created_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Phase {
    pub(crate) fn enter_status(&mut self, target: PhaseStatus, now: Timestamp) {
        self.status = target;
        if target == PhaseStatus::Active {
            self.started_at.get_or_insert(now);
        }
        self.completed_at = if target.is_terminal() { Some(now) } else { None };
    }

    pub(crate) fn approve(&mut self, approved_by: &str, now: Timestamp) {
        self.approved = true;
        self.approved_by = Some(approved_by.to_string());
        self.approved_at = Some(now);
        self.rejection_reason = None;
    }

    pub(crate) fn reject(&mut self, reason: &str) {
        self.approved = false;
        self.approved_by = None;
        self.approved_at = None;
        self.rejection_reason = Some(reason.to_string());
    }
}
