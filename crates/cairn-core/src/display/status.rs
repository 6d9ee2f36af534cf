//! Status and confirmation message types for operation feedback.

use std::fmt;

/// A one-line outcome for operations that have no single resource to show,
/// such as bulk submissions.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    /// Create a new success status.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// Create a new failure status.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.success { "Success:" } else { "Error:" };
        writeln!(f, "{prefix} {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        let success = OperationStatus::success("Submitted 3 tasks for approval");
        assert_eq!(success.to_string(), "Success: Submitted 3 tasks for approval\n");

        let failure = OperationStatus::failure(format!("{} plans failed to load", 2));
        assert!(failure.to_string().starts_with("Error:"));
    }
}
