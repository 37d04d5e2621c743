//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, missing targets). Backing-store failures belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank actor name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. empty document id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The targeted studio/equipment/unit/record is absent from the current snapshot.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target is already in the requested state (e.g. a unit that is already repaired).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Trim a person name and reject blanks.
///
/// Used for both mutation actors and studio assignees.
pub fn require_name(field: &str, raw: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_name_trims() {
        assert_eq!(require_name("actor", "  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn require_name_rejects_blank() {
        let err = require_name("actor", "   ").unwrap_err();
        assert_eq!(err, DomainError::Validation("actor cannot be empty".into()));
    }

    #[test]
    fn not_found_display_names_the_target() {
        let err = DomainError::not_found("unit u-9");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: unit u-9");
    }
}
