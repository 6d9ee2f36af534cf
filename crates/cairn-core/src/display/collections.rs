//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper handles the empty case with a one-line message so callers
//! never print a blank screen.

use std::{fmt, ops::Index};

use crate::models::{Phase, PlanSummary, Task};

/// Newtype wrapper for displaying collections of plan summaries.
///
/// # Examples
///
/// ```rust
/// use cairn_core::{
///     display::PlanSummaries,
///     models::{PlanStatus, PlanSummary},
/// };
/// use jiff::Timestamp;
///
/// let summary = PlanSummary {
///     id: "plan.auth".to_string(),
///     slug: "auth".to_string(),
///     title: "Authentication".to_string(),
///     status: PlanStatus::Approved,
///     created_at: Timestamp::now(),
///     total_tasks: 3,
///     completed_tasks: 1,
///     failed_tasks: 0,
///     awaiting_approval: 2,
///     total_phases: 0,
///     completed_phases: 0,
/// };
///
/// let output = PlanSummaries(vec![summary]).to_string();
/// assert!(output.contains("Authentication (auth) (1/3)"));
/// ```
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of plan summaries in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get an iterator over the plan summaries.
    pub fn iter(&self) -> std::slice::Iter<'_, PlanSummary> {
        self.0.iter()
    }
}

impl Index<usize> for PlanSummaries {
    type Output = PlanSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for PlanSummaries {
    type Item = PlanSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlanSummaries {
    type Item = &'a PlanSummary;
    type IntoIter = std::slice::Iter<'a, PlanSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for plan in &self.0 {
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying the tasks of a plan in sequence order.
pub struct Tasks(pub Vec<Task>);

impl Tasks {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Tasks {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Tasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks found.");
        }
        for task in &self.0 {
            write!(f, "{task}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying the phases of a plan in sequence order.
pub struct Phases(pub Vec<Phase>);

impl Phases {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Phases {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Phases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No phases found.");
        }
        for phase in &self.0 {
            write!(f, "{phase}")?;
        }
        Ok(())
    }
}
