use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use studioinv_events::{SnapshotEnvelope, Subscription};

/// Field map of one stored document (the id is kept outside the map).
pub type Fields = Map<String, JsonValue>;

/// Full snapshot of one collection as delivered to subscribers.
pub type CollectionSnapshot = SnapshotEnvelope<Document>;

/// A stored document: opaque string id + JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a document from a typed record whose serialized form carries an `id` string.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, StoreError> {
        let value = serde_json::to_value(record).map_err(|e| StoreError::Codec(e.to_string()))?;
        let JsonValue::Object(mut fields) = value else {
            return Err(StoreError::Codec("record did not serialize to an object".to_string()));
        };
        let id = match fields.remove("id") {
            Some(JsonValue::String(id)) if !id.is_empty() => id,
            _ => return Err(StoreError::Codec("record has no string id".to_string())),
        };
        Ok(Self { id, fields })
    }

    /// Decode into a typed record. The document id is injected as `id`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), JsonValue::String(self.id.clone()));
        serde_json::from_value(JsonValue::Object(fields))
            .map_err(|e| StoreError::Codec(format!("document '{}': {e}", self.id)))
    }
}

/// A single field operation, resolved by the store at commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Overwrite the field.
    Set(JsonValue),
    /// Append each value not already present (array treated as a set).
    ArrayUnion(Vec<JsonValue>),
    /// Remove every occurrence of each value. Absent values are ignored.
    ArrayRemove(Vec<JsonValue>),
    /// The store's own clock at commit time.
    ServerTimestamp,
    /// Negate a boolean field; an absent field counts as `false`.
    Toggle,
}

impl FieldWrite {
    pub fn set<T: Serialize + ?Sized>(value: &T) -> Result<Self, StoreError> {
        serde_json::to_value(value)
            .map(FieldWrite::Set)
            .map_err(|e| StoreError::Codec(e.to_string()))
    }
}

/// One write inside an atomic commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create a new document. Fails if the id is taken.
    Create {
        collection: String,
        id: String,
        fields: Vec<(String, FieldWrite)>,
    },
    /// Apply field writes to an existing document. Fails if it does not exist.
    Update {
        collection: String,
        id: String,
        fields: Vec<(String, FieldWrite)>,
    },
    /// Delete an existing document. Fails if it does not exist.
    Delete { collection: String, id: String },
}

impl Write {
    pub fn create(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Write::Create {
            collection: collection.into(),
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn update(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Write::Update {
            collection: collection.into(),
            id: id.into(),
            fields: Vec::new(),
        }
    }

    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Write::Delete {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Add a field operation (no-op on `Delete`).
    pub fn field(mut self, name: impl Into<String>, op: FieldWrite) -> Self {
        match &mut self {
            Write::Create { fields, .. } | Write::Update { fields, .. } => fields.push((name.into(), op)),
            Write::Delete { .. } => {}
        }
        self
    }

    pub fn collection(&self) -> &str {
        match self {
            Write::Create { collection, .. } | Write::Update { collection, .. } | Write::Delete { collection, .. } => {
                collection
            }
        }
    }

    pub fn document_id(&self) -> &str {
        match self {
            Write::Create { id, .. } | Write::Update { id, .. } | Write::Delete { id, .. } => id,
        }
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Server time used for every `ServerTimestamp` in the batch.
    pub committed_at: DateTime<Utc>,
    pub writes: usize,
}

/// Backing store operation error.
///
/// These are **infrastructure errors** (connectivity, rejection, encoding) as
/// opposed to domain errors (validation, missing targets in the current view).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (offline, connection dropped).
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write (permissions, validation, id clash).
    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    /// A value could not be converted to or from JSON.
    #[error("document codec error: {0}")]
    Codec(String),
}

/// Document-oriented backing store with live collection listeners.
///
/// ## Primitives
///
/// Consumers depend on exactly these capabilities:
///
/// - **subscribe**: a live stream of full collection snapshots, starting with
///   the current content
/// - **commit**: an atomic batch of create / update / delete writes, where an
///   update may use set, array-union, array-remove, server-timestamp and
///   toggle field operations
///
/// ## Commit Semantics
///
/// - All writes in a batch apply, or none do.
/// - Field operations resolve against the stored value at commit time, so
///   array-union, array-remove and toggle never lose a concurrent update.
/// - Snapshots for every touched collection are published **after** the batch
///   is applied; a rejected batch publishes nothing. A batch that landed is
///   reported as committed even if a listener could not be notified.
///
/// ## Delivery
///
/// Snapshot revisions increase by one per commit touching the collection.
/// Subscribers may see a revision more than once and must ignore stale ones.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Atomically apply a batch of writes.
    async fn commit(&self, writes: Vec<Write>) -> Result<CommitReceipt, StoreError>;

    /// Subscribe to a collection. The current snapshot is delivered first.
    fn subscribe(&self, collection: &str) -> Subscription<CollectionSnapshot>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn commit(&self, writes: Vec<Write>) -> Result<CommitReceipt, StoreError> {
        (**self).commit(writes).await
    }

    fn subscribe(&self, collection: &str) -> Subscription<CollectionSnapshot> {
        (**self).subscribe(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Room {
        id: String,
        name: String,
    }

    #[test]
    fn record_round_trips_through_document() {
        let room = Room {
            id: "studio-1".into(),
            name: "1號棚".into(),
        };
        let doc = Document::from_record(&room).unwrap();
        assert_eq!(doc.id, "studio-1");
        assert!(!doc.fields.contains_key("id"));
        assert_eq!(doc.decode::<Room>().unwrap(), room);
    }

    #[test]
    fn record_without_id_is_rejected() {
        let err = Document::from_record(&json!({ "name": "x" })).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn decode_error_names_the_document() {
        let doc = Document::new("bad", Fields::new());
        let err = doc.decode::<Room>().unwrap_err();
        assert!(err.to_string().contains("'bad'"));
    }

    #[test]
    fn builder_collects_field_ops() {
        let write = Write::update("equipment_units", "u1")
            .field("status", FieldWrite::set("normal").unwrap())
            .field("replacementPending", FieldWrite::Toggle);

        assert_eq!(write.collection(), "equipment_units");
        assert_eq!(write.document_id(), "u1");
        let Write::Update { fields, .. } = write else {
            panic!("expected update");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].1, FieldWrite::Set(json!("normal")));
    }
}
