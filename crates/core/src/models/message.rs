//! Chat message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{UserId, UserProfile};
use crate::store::{Document, Record};

/// An immutable chat message
///
/// The sender name is copied at send time. `sent_at` is the ordering key and
/// is stored as microseconds since the epoch so that stored values sort
/// numerically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "uid")]
    pub sender_id: UserId,
    #[serde(rename = "name")]
    pub sender_name: String,
    pub text: String,
    #[serde(rename = "date", with = "chrono::serde::ts_microseconds")]
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub const SENT_AT: &'static str = "date";

    pub fn compose(sender: &UserProfile, text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            sender_id: sender.uid.clone(),
            sender_name: sender.name.clone(),
            text: text.into(),
            sent_at,
        }
    }

    /// Messages with a blank sender, name or body are not displayed
    pub fn is_well_formed(&self) -> bool {
        !self.sender_id.is_blank()
            && !self.sender_name.trim().is_empty()
            && !self.text.trim().is_empty()
    }

    pub fn format_timestamp(&self) -> String {
        self.sent_at.format("%H:%M").to_string()
    }
}

impl Record for Message {
    fn from_document(doc: &Document) -> Option<Self> {
        doc.decode::<Message>()
            .ok()
            .filter(Message::is_well_formed)
    }
}
