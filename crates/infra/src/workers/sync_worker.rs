use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::document_store::DocumentStore;
use crate::reconciliation::InventoryStore;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    ///
    /// Dropping the handle without calling this also stops the worker.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(join) = self.join.take() {
            if let Err(err) = join.await {
                warn!(error = %err, "sync worker task failed");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

/// Snapshot pump between a backend and an [`InventoryStore`].
///
/// - Subscribes to every source collection (current content first)
/// - Applies each delivered snapshot; stale revisions are dropped by the store
/// - Stops on shutdown or when every feed has closed
#[derive(Debug)]
pub struct SyncWorker;

impl SyncWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn<S>(store: Arc<InventoryStore<S>>) -> WorkerHandle
    where
        S: DocumentStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut feeds = store.attach();

        let join = tokio::spawn(async move {
            let mut shutdown_rx = shutdown_rx;
            info!("sync worker started");
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    snapshot = feeds.next() => match snapshot {
                        Some(snapshot) => {
                            store.apply_snapshot(&snapshot);
                        }
                        None => {
                            debug!("all feeds closed");
                            break;
                        }
                    },
                }
            }
            info!("sync worker stopped");
        });

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}
