//! In-memory change bus for tests/dev.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::bus::{ChangeBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("subscriber list lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus.
///
/// - No IO
/// - Best-effort fan-out (dropped subscribers are pruned on publish)
/// - At-least-once acceptable (subscribers compare revisions)
#[derive(Debug)]
pub struct InMemoryChangeBus<M> {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<M>>>,
}

impl<M> InMemoryChangeBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscribers (as of the last publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }

    /// Subscribe and queue `initial` as the first message.
    ///
    /// The initial message is enqueued before the sender is registered, so a
    /// concurrent publish can only land *after* it.
    pub fn subscribe_with_initial(&self, initial: M) -> Subscription<M> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(initial);

        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

impl<M> Default for InMemoryChangeBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> ChangeBus<M> for InMemoryChangeBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::unbounded_channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = InMemoryChangeBus::<u32>::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(7).unwrap();

        assert_eq!(a.recv().await, Some(7));
        assert_eq!(b.recv().await, Some(7));
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let bus = InMemoryChangeBus::<u32>::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(1).unwrap();
        assert_eq!(bus.subscriber_count(), 1);
        drop(keep);
    }

    #[test]
    fn initial_message_precedes_later_publishes() {
        let bus = InMemoryChangeBus::<&'static str>::new();
        let mut sub = bus.subscribe_with_initial("initial");
        bus.publish("next").unwrap();

        assert_eq!(sub.try_recv().unwrap(), "initial");
        assert_eq!(sub.try_recv().unwrap(), "next");
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn latest_keeps_only_newest() {
        let bus = InMemoryChangeBus::<u32>::new();
        let mut sub = bus.subscribe();
        for n in 1..=3 {
            bus.publish(n).unwrap();
        }
        assert_eq!(sub.latest(), Some(3));
        assert_eq!(sub.latest(), None);
    }
}
