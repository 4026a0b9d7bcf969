//! Snapshot-backed lists for views

use tracing::warn;

use super::{DocumentStore, Query, Record, Snapshot, Subscription};

/// The rendered side of a subscription
///
/// Every snapshot replaces the whole list. A subscription error stops
/// updates: the last list stays visible and the listener is released.
pub struct LiveList<T> {
    subscription: Option<Subscription>,
    items: Vec<T>,
}

impl<T: Record> LiveList<T> {
    pub fn mount(store: &dyn DocumentStore, query: Query) -> Self {
        Self::new(store.subscribe(query))
    }

    /// Render snapshots from an existing subscription
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription: Some(subscription),
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether snapshots can still arrive
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply every snapshot already queued; true if the list was replaced
    pub fn pump(&mut self) -> bool {
        let mut replaced = false;
        while let Some(snapshot) = self.subscription.as_mut().and_then(Subscription::try_next) {
            replaced |= self.apply(snapshot);
        }
        replaced
    }

    /// Wait for the next snapshot; false once the listener has ended
    pub async fn changed(&mut self) -> bool {
        let next = match self.subscription.as_mut() {
            Some(sub) => sub.next().await,
            None => return false,
        };
        match next {
            Some(snapshot) => self.apply(snapshot),
            None => {
                self.subscription = None;
                false
            }
        }
    }

    fn apply(&mut self, snapshot: Snapshot) -> bool {
        match snapshot {
            Ok(docs) => {
                self.items = docs.iter().filter_map(T::from_document).collect();
                true
            }
            Err(e) => {
                if let Some(sub) = self.subscription.take() {
                    warn!(listener = %sub.id(), error = %e, "Subscription ended, list frozen");
                }
                false
            }
        }
    }
}
