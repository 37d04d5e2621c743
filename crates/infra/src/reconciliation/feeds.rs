use studioinv_events::Subscription;

use crate::document_store::{CollectionSnapshot, DocumentStore};

use super::store::InventoryStore;

/// The four live subscriptions an [`InventoryStore`] consumes.
#[derive(Debug)]
pub struct StoreFeeds {
    studios: Subscription<CollectionSnapshot>,
    equipment: Subscription<CollectionSnapshot>,
    units: Subscription<CollectionSnapshot>,
    history: Subscription<CollectionSnapshot>,
}

impl StoreFeeds {
    pub fn new(
        studios: Subscription<CollectionSnapshot>,
        equipment: Subscription<CollectionSnapshot>,
        units: Subscription<CollectionSnapshot>,
        history: Subscription<CollectionSnapshot>,
    ) -> Self {
        Self {
            studios,
            equipment,
            units,
            history,
        }
    }

    /// Wait for the next snapshot from any feed.
    ///
    /// No ordering is promised across feeds. Returns `None` once every feed
    /// has closed.
    pub async fn next(&mut self) -> Option<CollectionSnapshot> {
        tokio::select! {
            Some(snapshot) = self.studios.recv() => Some(snapshot),
            Some(snapshot) = self.equipment.recv() => Some(snapshot),
            Some(snapshot) = self.units.recv() => Some(snapshot),
            Some(snapshot) = self.history.recv() => Some(snapshot),
            else => None,
        }
    }

    /// Apply whatever is queued right now without waiting; only the newest
    /// snapshot of each feed matters. Returns how many views were published.
    pub fn drain<S: DocumentStore>(&mut self, store: &InventoryStore<S>) -> usize {
        [
            &mut self.studios,
            &mut self.equipment,
            &mut self.units,
            &mut self.history,
        ]
        .into_iter()
        .filter_map(Subscription::latest)
        .filter(|snapshot| store.apply_snapshot(snapshot))
        .count()
    }
}
