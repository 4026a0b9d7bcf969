//! Schemaless documents and typed records

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::DocumentId;

/// Top-level fields of a document
pub type Fields = serde_json::Map<String, Value>;

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Build a document from a JSON object
    pub fn from_value(id: &str, value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(DocumentId::from(id), fields)),
            other => Err(Error::InvalidOperation(format!(
                "document body must be an object, got {}",
                other
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Deserialize the fields into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Serialize a record into document fields
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::InvalidOperation(format!(
            "record must serialize to an object, got {}",
            other
        ))),
    }
}

/// A typed view over snapshot documents
///
/// Documents that do not decode are dropped from the rendered list.
pub trait Record: Sized {
    fn from_document(doc: &Document) -> Option<Self>;
}
