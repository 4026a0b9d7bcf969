//! Live query listeners
//!
//! Each listener owns the sending half of an unbounded channel. After a write,
//! the backend calls [`ListenerRegistry::notify`] and every listener on the
//! touched collection receives its full re-evaluated result set.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{Document, Query};
use crate::error::{Error, Result};

/// One delivery: the complete result set, or the error that ended the listener
pub type Snapshot = Result<Vec<Document>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct Listener {
    query: Query,
    tx: mpsc::UnboundedSender<Snapshot>,
}

/// Registered listeners of one backend
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<ListenerId, Listener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a query and queue its initial snapshot.
    ///
    /// A failed initial snapshot is delivered and the listener is never kept.
    pub fn register(self: &Arc<Self>, query: Query, initial: Snapshot) -> Subscription {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();

        match initial {
            Ok(docs) => {
                let _ = tx.send(Ok(docs));
                debug!(%id, collection = query.collection_path(), "Listener registered");
                self.listeners().insert(id, Listener { query, tx });
            }
            Err(e) => {
                warn!(%id, collection = query.collection_path(), error = %e, "Listener failed on registration");
                let _ = tx.send(Err(Error::Subscription(e.to_string())));
            }
        }

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(self),
        }
    }

    /// Release a listener; returns false if it was already gone
    pub fn remove(&self, id: ListenerId) -> bool {
        self.listeners().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-run every listener on `collection` and push the results.
    ///
    /// A listener whose query fails gets the error and is dropped, as is one
    /// whose receiver has gone away.
    pub fn notify<F>(&self, collection: &str, run: F)
    where
        F: Fn(&Query) -> Snapshot,
    {
        let targets: Vec<(ListenerId, Query, mpsc::UnboundedSender<Snapshot>)> = self
            .listeners()
            .iter()
            .filter(|(_, l)| l.query.collection_path() == collection)
            .map(|(id, l)| (*id, l.query.clone(), l.tx.clone()))
            .collect();

        for (id, query, tx) in targets {
            let snapshot = run(&query).map_err(|e| Error::Subscription(e.to_string()));
            let failed = snapshot.is_err();
            if failed {
                warn!(%id, collection, "Listener terminated by query failure");
            }
            if tx.send(snapshot).is_err() || failed {
                self.remove(id);
            }
        }
    }
}

/// Handle to a live query
///
/// Dropping the handle releases the listener; [`Subscription::unsubscribe`]
/// does the same explicitly.
pub struct Subscription {
    id: ListenerId,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub(crate) fn id(&self) -> ListenerId {
        self.id
    }

    /// Wait for the next snapshot. `None` once the listener has ended.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Take a queued snapshot without waiting
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                debug!(id = %self.id, "Listener released");
            }
        }
    }
}
