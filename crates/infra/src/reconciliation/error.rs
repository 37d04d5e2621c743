use thiserror::Error;

use studioinv_core::DomainError;

use crate::document_store::StoreError;

/// Error returned by every inventory mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// The request was invalid against the current view (blank actor,
    /// unknown studio/equipment/unit/record, already repaired).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store failed or refused the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InventoryError {
    pub fn is_not_found(&self) -> bool {
        match self {
            InventoryError::Domain(e) => e.is_not_found(),
            InventoryError::Store(e) => matches!(e, StoreError::DocumentNotFound { .. }),
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, InventoryError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_both_layers() {
        assert!(InventoryError::from(DomainError::not_found("studio s9")).is_not_found());
        assert!(
            InventoryError::from(StoreError::DocumentNotFound {
                collection: "maintenance_history".into(),
                id: "m1".into(),
            })
            .is_not_found()
        );
        assert!(!InventoryError::from(StoreError::Unavailable("offline".into())).is_not_found());
    }

    #[test]
    fn store_failures_are_told_apart_from_domain_errors() {
        assert!(InventoryError::from(StoreError::Rejected("id clash".into())).is_store_failure());
        assert!(!InventoryError::from(DomainError::conflict("unit u1 is already repaired")).is_store_failure());
    }

    #[test]
    fn display_is_transparent() {
        let err = InventoryError::from(DomainError::validation("actor cannot be empty"));
        assert_eq!(err.to_string(), "validation failed: actor cannot be empty");
    }
}
