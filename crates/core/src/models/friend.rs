//! Friend link model
//!
//! Links are directional: owner -> friend. The friend's name is copied at
//! link time and never refreshed.

use serde::{Deserialize, Serialize};

use super::{DocumentId, UserId};
use crate::store::{Document, Record};

/// A row of the `friends` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendLink {
    #[serde(rename = "uid", default)]
    pub owner: UserId,
    #[serde(rename = "friendUid", default)]
    pub friend: UserId,
    #[serde(rename = "friendName", default)]
    pub friend_name: String,
}

impl FriendLink {
    pub const COLLECTION: &'static str = "friends";
    pub const OWNER: &'static str = "uid";

    pub fn new(owner: UserId, friend: UserId, friend_name: impl Into<String>) -> Self {
        Self {
            owner,
            friend,
            friend_name: friend_name.into(),
        }
    }
}

/// A friend as listed in the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friend {
    pub document_id: DocumentId,
    pub uid: UserId,
    pub name: String,
}

impl Record for Friend {
    fn from_document(doc: &Document) -> Option<Self> {
        let link: FriendLink = doc.decode().ok()?;
        Some(Self {
            document_id: doc.id.clone(),
            uid: link.friend,
            name: link.friend_name,
        })
    }
}
