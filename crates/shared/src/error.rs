//! Coarse application-level error envelope.
//!
//! Domain modules define their own precise error enums with per-variant
//! codes. `AppError` is the envelope outer surfaces (jobs, a future RPC
//! layer) fold those into when the precise variant no longer matters.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error envelope.
#[derive(Debug, Error)]
pub enum AppError {
    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request itself is malformed (bad amount, bad scale, empty batch).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request is well-formed but a ledger rule rejects it.
    #[error("rule violation: {0}")]
    RuleViolation(String),

    /// A concurrent writer committed first; the operation can be retried.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage layer failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// An invariant the engines guarantee did not hold.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::RuleViolation(_) => 422,
            Self::Conflict(_) => 409,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RuleViolation(_) => "RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same operation can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("invoice".into()).status_code(), 404);
        assert_eq!(AppError::Validation("scale".into()).status_code(), 400);
        assert_eq!(AppError::RuleViolation("cap".into()).status_code(), 422);
        assert_eq!(AppError::Conflict("invoice v3".into()).status_code(), 409);
        assert_eq!(AppError::Storage("io".into()).status_code(), 500);
        assert_eq!(AppError::Internal("drift".into()).status_code(), 500);
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(AppError::Conflict("payment v1".into()).is_retryable());
        assert!(!AppError::RuleViolation("cap".into()).is_retryable());
        assert!(!AppError::Storage("io".into()).is_retryable());
    }

    #[test]
    fn test_display_names_the_failure() {
        let err = AppError::Conflict("invoice abc at version 3".into());
        assert_eq!(err.to_string(), "conflict: invoice abc at version 3");
        assert_eq!(err.error_code(), "CONFLICT");
    }
}
