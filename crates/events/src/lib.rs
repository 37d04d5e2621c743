//! Change-notification plumbing.
//!
//! A backing store publishes one [`SnapshotEnvelope`] per collection change;
//! consumers hold a [`Subscription`] and always receive full snapshots, never
//! deltas.

pub mod bus;
pub mod in_memory_bus;
pub mod snapshot;

pub use bus::{ChangeBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryChangeBus};
pub use snapshot::SnapshotEnvelope;
