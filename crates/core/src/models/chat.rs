//! Chat model and membership rules

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatId, UserId};
use crate::store::{Document, Fields, Record};

/// A chat document: owner plus the member id list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub owner: UserId,
    #[serde(default)]
    pub members: Vec<UserId>,
}

impl Chat {
    pub const COLLECTION: &'static str = "chats";
    pub const MEMBERS: &'static str = "members";

    /// New chat with the creator as its only member
    pub fn new(owner: UserId) -> Self {
        Self {
            members: vec![owner.clone()],
            owner,
        }
    }

    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Union the given ids into the member list, returning how many were added
    pub fn register_members<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = UserId>,
    {
        fold_members(&mut self.members, candidates)
    }

    /// Repair a chat read from the store: drop repeated members and put a
    /// missing owner back at the front. Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let stored = self.members.len();
        let mut members = Vec::with_capacity(stored + 1);
        let kept = fold_members(&mut members, self.members.drain(..));
        let mut changed = kept != stored;
        if !members.contains(&self.owner) {
            members.insert(0, self.owner.clone());
            changed = true;
        }
        self.members = members;
        changed
    }

    /// Update replacing the whole `members` field
    pub fn members_update(&self) -> Fields {
        let members = self
            .members
            .iter()
            .map(|m| Value::String(m.to_string()))
            .collect();
        let mut fields = Fields::new();
        fields.insert(Self::MEMBERS.to_string(), Value::Array(members));
        fields
    }

    /// Path of this chat's message subcollection
    pub fn messages_path(chat_id: &ChatId) -> String {
        format!("{}/{}/messages", Self::COLLECTION, chat_id)
    }
}

/// Append each candidate not already present, keeping first-seen order
pub fn fold_members<I>(members: &mut Vec<UserId>, candidates: I) -> usize
where
    I: IntoIterator<Item = UserId>,
{
    let mut added = 0;
    for candidate in candidates {
        if !members.contains(&candidate) {
            members.push(candidate);
            added += 1;
        }
    }
    added
}

/// A chat as listed on the home screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: ChatId,
    pub chat: Chat,
}

impl Record for ChatSummary {
    fn from_document(doc: &Document) -> Option<Self> {
        let chat: Chat = doc.decode().ok()?;
        Some(Self {
            id: doc.id.clone(),
            chat,
        })
    }
}
