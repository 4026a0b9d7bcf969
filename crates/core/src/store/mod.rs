//! Document store interface
//!
//! The client talks to its backend through [`DocumentStore`]: one-shot reads
//! and writes plus live subscriptions that push full snapshots. The bundled
//! SQLite [`crate::storage::Database`] implements it; a hosted service can too.

mod document;
mod listeners;
mod live;
mod query;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::DocumentId;

pub use document::{to_fields, Document, Fields, Record};
pub use listeners::{ListenerRegistry, Snapshot, Subscription};
pub use live::LiveList;
pub use query::{Direction, Filter, OrderBy, Query};

/// Operations consumed from the document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register a live query. The current result set is queued immediately and
    /// again after every change that touches the collection.
    fn subscribe(&self, query: Query) -> Subscription;

    /// Run a query once
    async fn get_once(&self, query: &Query) -> Result<Vec<Document>>;

    /// Fetch a single document by id
    async fn get_document(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>>;

    /// Insert a document under a fresh id
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentId>;

    /// Merge fields into an existing document
    async fn update_document(&self, collection: &str, id: &DocumentId, fields: Fields)
        -> Result<()>;
}
