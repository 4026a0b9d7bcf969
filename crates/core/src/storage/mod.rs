//! SQLite storage layer for Natter
//!
//! A local document store: every collection lives in one `documents` table
//! and live queries are re-evaluated in process after each write.

mod accounts;
mod documents;
mod migrations;
mod parse;

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::models::DocumentId;
use crate::store::{Document, DocumentStore, Fields, ListenerRegistry, Query, Subscription};

pub use accounts::{Account, AccountStore};
pub use documents::DocumentTable;

/// Main database handle
pub struct Database {
    conn: Mutex<Connection>,
    listeners: Arc<ListenerRegistry>,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Initialize database schema via migrations
    fn init(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            listeners: ListenerRegistry::new(),
        })
    }

    /// Run a closure against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::InvalidOperation("database lock poisoned".to_string()))?;
        f(&conn)
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })?)
        })
        .unwrap_or(0)
    }

    /// Number of live listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn run_query(&self, query: &Query) -> Result<Vec<Document>> {
        let docs = self.with_conn(|conn| DocumentTable::new(conn).list(query.collection_path()))?;
        Ok(query.apply(docs))
    }

    fn notify(&self, collection: &str) {
        self.listeners.notify(collection, |query| self.run_query(query));
    }
}

#[async_trait]
impl DocumentStore for Database {
    fn subscribe(&self, query: Query) -> Subscription {
        let initial = self.run_query(&query);
        self.listeners.register(query, initial)
    }

    async fn get_once(&self, query: &Query) -> Result<Vec<Document>> {
        self.run_query(query)
    }

    async fn get_document(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        self.with_conn(|conn| DocumentTable::new(conn).find(collection, id))
    }

    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentId> {
        let id = DocumentId::generate();
        self.with_conn(|conn| DocumentTable::new(conn).insert(collection, &id, &fields))?;
        debug!(collection, id = %id, "Document added");
        self.notify(collection);
        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<()> {
        self.with_conn(|conn| DocumentTable::new(conn).merge(collection, id, fields))?;
        debug!(collection, id = %id, "Document updated");
        self.notify(collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        crate::store::to_fields(&value).unwrap()
    }

    #[test]
    fn test_open_in_memory_runs_migrations() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version(), 2);
    }

    #[tokio::test]
    async fn test_add_get_update() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .add_document("users", fields(json!({ "uid": "u1", "name": "No Name" })))
            .await
            .unwrap();

        db.update_document("users", &id, fields(json!({ "name": "Ann" })))
            .await
            .unwrap();

        let doc = db.get_document("users", &id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("name"), Some("Ann"));
        assert_eq!(doc.get_str("uid"), Some("u1"));

        assert!(db
            .get_document("friends", &id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .update_document("chats", &DocumentId::from("nope"), fields(json!({ "members": [] })))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_once_filters() {
        let db = Database::open_in_memory().unwrap();
        db.add_document("users", fields(json!({ "uid": "u1" })))
            .await
            .unwrap();
        db.add_document("users", fields(json!({ "uid": "u2" })))
            .await
            .unwrap();

        let found = db
            .get_once(&Query::collection("users").where_eq("uid", "u2"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_str("uid"), Some("u2"));
    }

    #[tokio::test]
    async fn test_subscription_sees_updates_on_its_collection_only() {
        let db = Database::open_in_memory().unwrap();
        let chat = db
            .add_document("chats", fields(json!({ "owner": "u1", "members": ["u1"] })))
            .await
            .unwrap();

        let mut sub = db.subscribe(Query::collection("chats").where_array_contains("members", "u2"));
        assert!(sub.next().await.unwrap().unwrap().is_empty());

        let messages = format!("chats/{}/messages", chat);
        db.add_document(&messages, fields(json!({ "text": "hi" })))
            .await
            .unwrap();
        assert!(sub.try_next().is_none());

        db.update_document("chats", &chat, fields(json!({ "members": ["u1", "u2"] })))
            .await
            .unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, chat);
    }

    #[tokio::test]
    async fn test_documents_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("natter.db");

        let id = {
            let db = Database::open(&path).unwrap();
            db.add_document("friends", fields(json!({ "uid": "u1" })))
                .await
                .unwrap()
        };

        let db = Database::open(&path).unwrap();
        assert!(db.get_document("friends", &id).await.unwrap().is_some());
        assert_eq!(
            db.with_conn(|conn| DocumentTable::new(conn).count("friends"))
                .unwrap(),
            1
        );
    }
}
