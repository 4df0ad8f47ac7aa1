//! One-line confirmation messages for CLI operations.

use std::fmt;

/// Outcome line printed after an operation that has no richer output.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.success { "Success:" } else { "Error:" };
        writeln!(f, "{label} {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        let success = OperationStatus::success("Job cancelled");
        assert_eq!(success.to_string(), "Success: Job cancelled\n");

        let failure = OperationStatus::failure("job stalled");
        assert!(failure.to_string().starts_with("Error:"));
    }
}
