//! Infrastructure layer: backing store, reconciliation store, workers, config.

pub mod config;
pub mod document_store;
pub mod reconciliation;
pub mod seed;
pub mod user_history;
pub mod workers;

pub use config::{CollectionNames, InventoryConfig};
pub use document_store::{DocumentStore, InMemoryDocumentStore, StoreError};
pub use reconciliation::{InventoryError, InventoryStore, InventoryView};
pub use workers::{SyncWorker, WorkerHandle};
