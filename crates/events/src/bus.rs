//! Snapshot publishing/subscription abstraction (mechanics only).
//!
//! This module provides the **change bus pattern**: a pub/sub mechanism that
//! distributes collection snapshots to every interested consumer.
//!
//! ## Design Philosophy
//!
//! - **Transport-agnostic**: in-memory channels for tests/dev, a hosted
//!   database's listener API in production.
//! - **At-least-once delivery**: a snapshot may be delivered more than once;
//!   consumers compare revisions and drop anything not newer.
//! - **Full snapshots**: every message replaces the consumer's copy of the
//!   collection, so a dropped intermediate message never causes drift.
//! - **No persistence**: the bus distributes, the store is the source of truth.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;

/// A subscription to a snapshot stream.
///
/// ## Usage Pattern
///
/// ```ignore
/// let mut subscription = bus.subscribe();
/// while let Some(snapshot) = subscription.recv().await {
///     store.apply(snapshot);
/// }
/// // `None`: the bus (or the backing store owning it) was dropped.
/// ```
///
/// Subscriptions are consumed by a single task. Messages arrive in publish
/// order for one bus; nothing is promised across different buses.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: UnboundedReceiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything currently queued and keep only the newest message.
    ///
    /// Full-snapshot streams never need the intermediate values.
    pub fn latest(&mut self) -> Option<M> {
        let mut last = None;
        while let Ok(msg) = self.receiver.try_recv() {
            last = Some(msg);
        }
        last
    }
}

/// Domain-agnostic change bus (pub/sub abstraction).
///
/// ```text
/// commit(writes) → Store (apply atomically) → ChangeBus (publish snapshot) → Subscribers
///                                                                             ├─ reconciliation store
///                                                                             └─ other views
/// ```
///
/// Snapshots are **published after the commit succeeds**, never before, so a
/// subscriber never observes a write that was later rejected.
///
/// `publish()` can fail (e.g. poisoned lock, broken transport); the failure is
/// surfaced to the committing caller.
pub trait ChangeBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> ChangeBus<M> for Arc<B>
where
    B: ChangeBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
