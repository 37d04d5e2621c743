//! Document-oriented backing store abstraction and implementations.

mod r#trait;

pub mod in_memory;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{
    CollectionSnapshot, CommitReceipt, Document, DocumentStore, FieldWrite, Fields, StoreError, Write,
};
