//! Document table operations

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;

use super::parse::{parse_fields, OptionalExt};
use crate::error::{Error, Result};
use crate::models::DocumentId;
use crate::store::{Document, Fields};

pub struct DocumentTable<'a> {
    conn: &'a Connection,
}

impl<'a> DocumentTable<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new document
    #[instrument(skip(self, fields))]
    pub fn insert(&self, collection: &str, id: &DocumentId, fields: &Fields) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, id, fields, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![
                collection,
                id.as_str(),
                serde_json::to_string(fields)?,
                now
            ],
        )?;
        Ok(())
    }

    /// Find a document by id
    pub fn find(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, fields FROM documents WHERE collection = ?1 AND id = ?2")?;

        let doc = stmt
            .query_row(params![collection, id.as_str()], Self::map_document)
            .optional()?;

        Ok(doc)
    }

    /// All documents of a collection in insertion order
    pub fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, fields FROM documents WHERE collection = ?1 ORDER BY seq")?;

        let docs = stmt
            .query_map(params![collection], Self::map_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(docs)
    }

    /// Overwrite the given top-level fields, keeping the rest
    #[instrument(skip(self, fields))]
    pub fn merge(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<()> {
        let mut doc = self
            .find(collection, id)?
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, id)))?;

        doc.fields.extend(fields);

        self.conn.execute(
            "UPDATE documents SET fields = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
            params![
                serde_json::to_string(&doc.fields)?,
                Utc::now().to_rfc3339(),
                collection,
                id.as_str()
            ],
        )?;
        Ok(())
    }

    /// Count documents in a collection
    #[cfg(test)]
    pub fn count(&self, collection: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn map_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document::new(
            DocumentId::new(row.get::<_, String>(0)?),
            parse_fields(&row.get::<_, String>(1)?)?,
        ))
    }
}
