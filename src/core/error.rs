//! Error kinds raised by the tracking core

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the core
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors surfaced by core operations
///
/// `AccessDenied` and `Validation` are business outcomes and are never
/// retried. Whenever one is returned the enclosing transaction has been
/// rolled back, so the store is left exactly as it was.
#[derive(Debug, Error, Diagnostic)]
pub enum TrackerError {
    #[error("Access denied: {0}")]
    #[diagnostic(code(sprinter::access_denied))]
    AccessDenied(String),

    #[error("{0}")]
    #[diagnostic(code(sprinter::validation))]
    Validation(String),

    #[error("{kind} {id} not found")]
    #[diagnostic(code(sprinter::not_found))]
    NotFound { kind: &'static str, id: String },

    #[error("Database error: {0}")]
    #[diagnostic(
        code(sprinter::database),
        help("Check that the workspace database is writable and not locked by another process")
    )]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(sprinter::io))]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn access_denied(message: impl Into<String>) -> Self {
        TrackerError::AccessDenied(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        TrackerError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, TrackerError::AccessDenied(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TrackerError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let denied = TrackerError::access_denied("no role");
        let invalid = TrackerError::validation("bad key");
        let missing = TrackerError::not_found("Project", 7);

        assert!(denied.is_access_denied() && !denied.is_validation());
        assert!(invalid.is_validation() && !invalid.is_not_found());
        assert!(missing.is_not_found() && !missing.is_access_denied());
    }

    #[test]
    fn test_not_found_message() {
        let err = TrackerError::not_found("Sprint", 42);
        assert_eq!(err.to_string(), "Sprint 42 not found");
    }
}
