use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use studioinv_events::{ChangeBus, InMemoryChangeBus, SnapshotEnvelope, Subscription};

use super::r#trait::{
    CollectionSnapshot, CommitReceipt, Document, DocumentStore, FieldWrite, Fields, StoreError, Write,
};

#[derive(Debug, Default, Clone)]
struct CollectionState {
    revision: u64,
    documents: Vec<Document>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, CollectionState>,
    buses: HashMap<String, InMemoryChangeBus<CollectionSnapshot>>,
}

impl Inner {
    fn snapshot(&self, collection: &str) -> CollectionSnapshot {
        match self.collections.get(collection) {
            Some(state) => SnapshotEnvelope::new(collection, state.revision, state.documents.clone()),
            None => SnapshotEnvelope::new(collection, 0, Vec::new()),
        }
    }
}

/// In-memory document store.
///
/// Intended for tests/dev. Commits are serialized behind one lock, so every
/// batch is atomic and every field operation sees the latest stored value.
/// Documents keep insertion order.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    inner: Mutex<Inner>,
    available: AtomicBool,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (or regaining) the connection. While unavailable every
    /// commit fails with [`StoreError::Unavailable`] and nothing is published.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Replace the content of a collection wholesale (fixtures, seeding).
    ///
    /// Counts as one revision and is published like a commit.
    pub fn seed(&self, collection: &str, documents: Vec<Document>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let state = inner.collections.entry(collection.to_string()).or_default();
        state.revision += 1;
        state.documents = documents;
        let snapshot = inner.snapshot(collection);
        publish_committed(&inner.buses, vec![snapshot]);
        Ok(())
    }

    /// [`seed`](Self::seed) from typed records.
    pub fn seed_records<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<(), StoreError> {
        let documents = records
            .iter()
            .map(Document::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        self.seed(collection, documents)
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        let inner = self.inner.lock().ok()?;
        inner
            .collections
            .get(collection)?
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.collections.get(collection).map(|s| s.documents.clone()))
            .unwrap_or_default()
    }

    /// Current revision of a collection (0 if never written).
    pub fn revision(&self, collection: &str) -> u64 {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.collections.get(collection).map(|s| s.revision))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

/// Fan snapshots of already-landed writes out to their listeners.
///
/// The batch is committed by the time this runs, so a bus that fails is logged
/// and skipped; the remaining collections still go out. Returns how many
/// snapshots were delivered.
fn publish_committed<B>(buses: &HashMap<String, B>, snapshots: Vec<CollectionSnapshot>) -> usize
where
    B: ChangeBus<CollectionSnapshot>,
{
    let mut delivered = 0;
    for snapshot in snapshots {
        let Some(bus) = buses.get(snapshot.collection()) else {
            continue;
        };
        let collection = snapshot.collection().to_string();
        let revision = snapshot.revision();
        match bus.publish(snapshot) {
            Ok(()) => delivered += 1,
            Err(error) => warn!(%collection, revision, ?error, "snapshot publication failed after commit"),
        }
    }
    delivered
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn commit(&self, writes: Vec<Write>) -> Result<CommitReceipt, StoreError> {
        if !self.is_available() {
            return Err(StoreError::Unavailable("backing store is offline".to_string()));
        }
        if writes.is_empty() {
            return Ok(CommitReceipt {
                committed_at: Utc::now(),
                writes: 0,
            });
        }

        let committed_at = Utc::now();
        let count = writes.len();
        let mut inner = self.lock()?;

        // Apply against working copies; the stored state is only replaced once
        // every write in the batch has succeeded.
        let mut touched: Vec<String> = Vec::new();
        let mut working: HashMap<String, Vec<Document>> = HashMap::new();
        for write in writes {
            let collection = write.collection().to_string();
            if !working.contains_key(&collection) {
                let current = inner
                    .collections
                    .get(&collection)
                    .map(|s| s.documents.clone())
                    .unwrap_or_default();
                working.insert(collection.clone(), current);
                touched.push(collection.clone());
            }
            let documents = working.entry(collection).or_default();
            apply_write(documents, write, committed_at)?;
        }

        let mut snapshots = Vec::with_capacity(touched.len());
        for collection in touched {
            let documents = working.remove(&collection).unwrap_or_default();
            let state = inner.collections.entry(collection.clone()).or_default();
            state.revision += 1;
            state.documents = documents;
            snapshots.push(inner.snapshot(&collection));
        }

        publish_committed(&inner.buses, snapshots);

        Ok(CommitReceipt {
            committed_at,
            writes: count,
        })
    }

    fn subscribe(&self, collection: &str) -> Subscription<CollectionSnapshot> {
        match self.inner.lock() {
            Ok(mut inner) => {
                let initial = inner.snapshot(collection);
                inner
                    .buses
                    .entry(collection.to_string())
                    .or_default()
                    .subscribe_with_initial(initial)
            }
            // A poisoned store still hands out a (silent) subscription.
            Err(_) => InMemoryChangeBus::<CollectionSnapshot>::new().subscribe(),
        }
    }
}

fn apply_write(documents: &mut Vec<Document>, write: Write, now: DateTime<Utc>) -> Result<(), StoreError> {
    match write {
        Write::Create { collection, id, fields } => {
            if documents.iter().any(|d| d.id == id) {
                return Err(StoreError::Rejected(format!("{collection}/{id} already exists")));
            }
            let mut doc = Document::new(id, Fields::new());
            for (name, op) in fields {
                apply_field(&mut doc.fields, name, op, now)?;
            }
            documents.push(doc);
        }
        Write::Update { collection, id, fields } => {
            let Some(doc) = documents.iter_mut().find(|d| d.id == id) else {
                return Err(StoreError::DocumentNotFound { collection, id });
            };
            for (name, op) in fields {
                apply_field(&mut doc.fields, name, op, now)?;
            }
        }
        Write::Delete { collection, id } => {
            let Some(idx) = documents.iter().position(|d| d.id == id) else {
                return Err(StoreError::DocumentNotFound { collection, id });
            };
            documents.remove(idx);
        }
    }
    Ok(())
}

fn apply_field(fields: &mut Fields, name: String, op: FieldWrite, now: DateTime<Utc>) -> Result<(), StoreError> {
    match op {
        FieldWrite::Set(value) => {
            fields.insert(name, value);
        }
        FieldWrite::ServerTimestamp => {
            let value = serde_json::to_value(now).map_err(|e| StoreError::Codec(e.to_string()))?;
            fields.insert(name, value);
        }
        FieldWrite::Toggle => {
            let next = match fields.get(&name) {
                None | Some(JsonValue::Null) => true,
                Some(JsonValue::Bool(b)) => !b,
                Some(_) => {
                    return Err(StoreError::Rejected(format!("cannot toggle non-boolean field '{name}'")));
                }
            };
            fields.insert(name, JsonValue::Bool(next));
        }
        FieldWrite::ArrayUnion(values) => {
            let array = array_field(fields, &name)?;
            for value in values {
                if !array.contains(&value) {
                    array.push(value);
                }
            }
        }
        FieldWrite::ArrayRemove(values) => {
            let array = array_field(fields, &name)?;
            array.retain(|v| !values.contains(v));
        }
    }
    Ok(())
}

fn array_field<'a>(fields: &'a mut Fields, name: &str) -> Result<&'a mut Vec<JsonValue>, StoreError> {
    let slot = fields
        .entry(name.to_string())
        .or_insert_with(|| JsonValue::Array(Vec::new()));
    if slot.is_null() {
        *slot = JsonValue::Array(Vec::new());
    }
    match slot {
        JsonValue::Array(array) => Ok(array),
        _ => Err(StoreError::Rejected(format!("field '{name}' is not an array"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, fields: JsonValue) -> Document {
        let JsonValue::Object(fields) = fields else {
            panic!("fixture must be an object");
        };
        Document::new(id, fields)
    }

    fn store_with_studio() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        store
            .seed("studios", vec![doc("s1", json!({ "name": "1號棚", "assignees": ["Alice"] }))])
            .unwrap();
        store
    }

    #[tokio::test]
    async fn array_union_and_remove_are_set_like() {
        let store = store_with_studio();

        store
            .commit(vec![
                Write::update("studios", "s1").field("assignees", FieldWrite::ArrayUnion(vec![json!("Alice"), json!("Bob")])),
            ])
            .await
            .unwrap();
        assert_eq!(store.document("studios", "s1").unwrap().fields["assignees"], json!(["Alice", "Bob"]));

        store
            .commit(vec![
                Write::update("studios", "s1").field("assignees", FieldWrite::ArrayRemove(vec![json!("Alice"), json!("Zed")])),
            ])
            .await
            .unwrap();
        assert_eq!(store.document("studios", "s1").unwrap().fields["assignees"], json!(["Bob"]));
    }

    #[tokio::test]
    async fn toggle_treats_absent_as_false() {
        let store = store_with_studio();
        let toggle = || vec![Write::update("studios", "s1").field("flag", FieldWrite::Toggle)];

        store.commit(toggle()).await.unwrap();
        assert_eq!(store.document("studios", "s1").unwrap().fields["flag"], json!(true));
        store.commit(toggle()).await.unwrap();
        assert_eq!(store.document("studios", "s1").unwrap().fields["flag"], json!(false));
    }

    #[tokio::test]
    async fn toggle_rejects_non_boolean() {
        let store = store_with_studio();
        let err = store
            .commit(vec![Write::update("studios", "s1").field("name", FieldWrite::Toggle)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn failed_batch_leaves_nothing_behind() {
        let store = store_with_studio();
        let before = store.revision("studios");

        let err = store
            .commit(vec![
                Write::update("studios", "s1").field("name", FieldWrite::set("renamed").unwrap()),
                Write::create("history", "h1").field("note", FieldWrite::set("x").unwrap()),
                Write::delete("studios", "missing"),
            ])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::DocumentNotFound {
                collection: "studios".into(),
                id: "missing".into()
            }
        );
        assert_eq!(store.revision("studios"), before);
        assert_eq!(store.document("studios", "s1").unwrap().fields["name"], json!("1號棚"));
        assert!(store.documents("history").is_empty());
    }

    #[tokio::test]
    async fn create_rejects_taken_id() {
        let store = store_with_studio();
        let err = store.commit(vec![Write::create("studios", "s1")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn offline_store_refuses_commits() {
        let store = store_with_studio();
        store.set_available(false);
        let err = store.commit(vec![Write::delete("studios", "s1")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_available(true);
        store.commit(vec![Write::delete("studios", "s1")]).await.unwrap();
        assert!(store.documents("studios").is_empty());
    }

    #[tokio::test]
    async fn subscribers_get_current_then_each_commit() {
        let store = store_with_studio();
        let mut sub = store.subscribe("studios");

        let first = sub.recv().await.unwrap();
        assert_eq!(first.revision(), 1);
        assert_eq!(first.documents().len(), 1);

        store
            .commit(vec![Write::create("studios", "s2").field("name", FieldWrite::set("2號棚").unwrap())])
            .await
            .unwrap();

        let second = sub.recv().await.unwrap();
        assert_eq!(second.revision(), 2);
        let ids: Vec<_> = second.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["s1", "s2"]);
    }

    #[tokio::test]
    async fn server_timestamp_uses_commit_time() {
        let store = store_with_studio();
        let receipt = store
            .commit(vec![Write::create("history", "h1").field("createdAt", FieldWrite::ServerTimestamp)])
            .await
            .unwrap();

        let stored: DateTime<Utc> =
            serde_json::from_value(store.document("history", "h1").unwrap().fields["createdAt"].clone()).unwrap();
        assert_eq!(stored, receipt.committed_at);
        assert_eq!(receipt.writes, 1);
    }

    struct ScriptedBus {
        fail: bool,
        seen: Mutex<Vec<u64>>,
    }

    impl ScriptedBus {
        fn new(fail: bool) -> Self {
            Self { fail, seen: Mutex::new(Vec::new()) }
        }
    }

    impl ChangeBus<CollectionSnapshot> for ScriptedBus {
        type Error = &'static str;

        fn publish(&self, message: CollectionSnapshot) -> Result<(), Self::Error> {
            if self.fail {
                return Err("listener gone");
            }
            self.seen.lock().unwrap().push(message.revision());
            Ok(())
        }

        fn subscribe(&self) -> Subscription<CollectionSnapshot> {
            let (_tx, rx) = tokio::sync::mpsc::unbounded_channel();
            Subscription::new(rx)
        }
    }

    #[test]
    fn failed_publication_does_not_stop_the_rest_of_the_batch() {
        let mut buses = HashMap::new();
        buses.insert("units".to_string(), ScriptedBus::new(true));
        buses.insert("history".to_string(), ScriptedBus::new(false));

        let snapshots = vec![
            SnapshotEnvelope::new("units", 3, Vec::<Document>::new()),
            SnapshotEnvelope::new("history", 7, Vec::<Document>::new()),
            SnapshotEnvelope::new("studios", 1, Vec::<Document>::new()),
        ];

        assert_eq!(publish_committed(&buses, snapshots), 1);
        assert_eq!(*buses["history"].seen.lock().unwrap(), vec![7]);
        assert!(buses["units"].seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_spanning_collections_notifies_each_listener() {
        let store = store_with_studio();
        let mut studios = store.subscribe("studios");
        let mut history = store.subscribe("history");
        assert_eq!(studios.recv().await.unwrap().revision(), 1);
        assert_eq!(history.recv().await.unwrap().revision(), 0);

        store
            .commit(vec![
                Write::update("studios", "s1").field("name", FieldWrite::set("2號棚").unwrap()),
                Write::create("history", "h1").field("createdAt", FieldWrite::ServerTimestamp),
            ])
            .await
            .unwrap();

        assert_eq!(studios.recv().await.unwrap().revision(), 2);
        let logged = history.recv().await.unwrap();
        assert_eq!(logged.revision(), 1);
        assert_eq!(logged.documents().len(), 1);
    }
}
