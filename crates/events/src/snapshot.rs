use std::sync::Arc;

/// Envelope for one full collection snapshot.
///
/// - `collection` names the source collection (`"studios"`, `"equipment"`, ...).
/// - `revision` is monotonically increasing per collection; consumers use it
///   to drop duplicate or out-of-date deliveries.
/// - `documents` is the complete, ordered content of the collection.
///
/// Documents sit behind an `Arc<[D]>` so fan-out to many subscribers shares
/// one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEnvelope<D> {
    collection: String,
    revision: u64,
    documents: Arc<[D]>,
}

impl<D> SnapshotEnvelope<D> {
    pub fn new(collection: impl Into<String>, revision: u64, documents: impl Into<Arc<[D]>>) -> Self {
        Self {
            collection: collection.into(),
            revision,
            documents: documents.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn documents(&self) -> &[D] {
        &self.documents
    }

    pub fn shared_documents(&self) -> Arc<[D]> {
        Arc::clone(&self.documents)
    }

    /// Whether this envelope supersedes a consumer that last applied `last_revision`.
    pub fn is_newer_than(&self, last_revision: Option<u64>) -> bool {
        match last_revision {
            None => true,
            Some(last) => self.revision > last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_comparison() {
        let env = SnapshotEnvelope::new("studios", 3, vec![1, 2]);
        assert!(env.is_newer_than(None));
        assert!(env.is_newer_than(Some(2)));
        assert!(!env.is_newer_than(Some(3)));
        assert!(!env.is_newer_than(Some(4)));
        assert_eq!(env.documents(), &[1, 2]);
    }
}
