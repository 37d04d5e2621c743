//! Inventory reconciliation store.
//!
//! Holds the latest full snapshot of each source collection, re-derives the
//! studio → equipment → unit tree whenever one of them changes, and publishes
//! the result to observers. Mutations are resolved against the current view
//! and committed to the backing store; the view only changes when the
//! resulting snapshot comes back.

mod error;
mod feeds;
mod store;
mod view;

pub use error::InventoryError;
pub use feeds::StoreFeeds;
pub use store::InventoryStore;
pub use view::{InventoryView, Source};
