//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Patient name is required")]
    MissingPatientName,

    #[error("Current problem is required")]
    MissingCurrentProblem,

    #[error("At least one participant is required to start a consultation")]
    NoParticipants,

    #[error("Duplicate participant id: {0}")]
    DuplicateParticipant(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Unknown transcript entry: #{0}")]
    UnknownEntry(u64),

    #[error("Invalid phase: expected {expected}, found {actual}")]
    InvalidPhase {
        expected: &'static str,
        actual: &'static str,
    },
}

impl DomainError {
    /// Check if this error is a start-time validation failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::MissingPatientName
                | DomainError::MissingCurrentProblem
                | DomainError::NoParticipants
                | DomainError::DuplicateParticipant(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            DomainError::MissingCurrentProblem.to_string(),
            "Current problem is required"
        );
        assert_eq!(
            DomainError::InvalidPhase {
                expected: "setup",
                actual: "finished"
            }
            .to_string(),
            "Invalid phase: expected setup, found finished"
        );
    }

    #[test]
    fn test_is_validation_check() {
        assert!(DomainError::MissingPatientName.is_validation());
        assert!(DomainError::NoParticipants.is_validation());
        assert!(!DomainError::UnknownParticipant("doc-9".to_string()).is_validation());
    }
}
