//! User profile model

use serde::{Deserialize, Serialize};

use super::{DocumentId, UserId};
use crate::store::{Document, Record};

/// Display name shown until a real one is known
pub const PLACEHOLDER_NAME: &str = "No Name";

fn placeholder_name() -> String {
    PLACEHOLDER_NAME.to_string()
}

/// Public profile stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: UserId,
    #[serde(default = "placeholder_name")]
    pub name: String,
}

impl UserProfile {
    pub const COLLECTION: &'static str = "users";
    pub const UID: &'static str = "uid";
    pub const NAME: &'static str = "name";

    pub fn new(uid: UserId, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
        }
    }

    /// Profile written at signup, before the user picks a name
    pub fn placeholder(uid: UserId) -> Self {
        Self::new(uid, PLACEHOLDER_NAME)
    }
}

/// A profile together with the document that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub document_id: DocumentId,
    pub profile: UserProfile,
}

impl Record for UserRecord {
    fn from_document(doc: &Document) -> Option<Self> {
        let profile: UserProfile = doc.decode().ok()?;
        Some(Self {
            document_id: doc.id.clone(),
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_name_falls_back_to_placeholder() {
        let doc = Document::from_value("d1", json!({ "uid": "u1" })).unwrap();
        let record = UserRecord::from_document(&doc).unwrap();
        assert_eq!(record.profile.name, PLACEHOLDER_NAME);
        assert_eq!(record.document_id.as_str(), "d1");
    }

    #[test]
    fn test_profile_without_uid_is_skipped() {
        let doc = Document::from_value("d1", json!({ "name": "Ann" })).unwrap();
        assert!(UserRecord::from_document(&doc).is_none());
    }
}
