//! Chat membership editor view model
//!
//! Reads the chat's member list once, then lists the user's friends. Friends
//! outside the chat can be selected; registering folds the selection into the
//! member list and writes the full list back in one update.

use std::sync::Arc;

use natter_core::{Chat, ChatId, Friend, LiveList, UserId};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::friends::roster_query;
use crate::session::Session;
use crate::state::AppContext;

pub struct MembershipEditor {
    ctx: Arc<AppContext>,
    session: Session,
    chat_id: ChatId,
    chat: Option<Chat>,
    roster: Option<LiveList<Friend>>,
    selection: Vec<UserId>,
}

impl MembershipEditor {
    pub fn new(ctx: Arc<AppContext>, session: Session, chat_id: ChatId) -> Self {
        Self {
            ctx,
            session,
            chat_id,
            chat: None,
            roster: None,
            selection: Vec::new(),
        }
    }

    /// Read the member list, then mount the roster
    pub async fn load(&mut self) {
        match self.ctx.store.get_document(Chat::COLLECTION, &self.chat_id).await {
            Ok(Some(doc)) => match doc.decode::<Chat>() {
                Ok(mut chat) => {
                    if chat.normalize() {
                        warn!(chat_id = %self.chat_id, "Stored member list repaired");
                    }
                    self.chat = Some(chat);
                }
                Err(e) => warn!(chat_id = %self.chat_id, error = %e, "Malformed chat document"),
            },
            Ok(None) => warn!(chat_id = %self.chat_id, "Chat not found"),
            Err(e) => warn!(chat_id = %self.chat_id, error = %e, "Failed to read chat"),
        }

        self.roster = Some(LiveList::mount(
            self.ctx.store.as_ref(),
            roster_query(&self.session),
        ));
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn is_loaded(&self) -> bool {
        self.chat.is_some()
    }

    /// Members as last read or registered
    pub fn members(&self) -> &[UserId] {
        self.chat.as_ref().map(|c| c.members.as_slice()).unwrap_or(&[])
    }

    /// Friends that are not yet members
    pub fn candidates(&self) -> Vec<&Friend> {
        let members = self.members();
        self.roster
            .as_ref()
            .map(|r| r.items())
            .unwrap_or(&[])
            .iter()
            .filter(|f| !members.contains(&f.uid))
            .collect()
    }

    pub fn pump(&mut self) -> bool {
        self.roster.as_mut().map(LiveList::pump).unwrap_or(false)
    }

    pub fn is_selected(&self, uid: &UserId) -> bool {
        self.selection.contains(uid)
    }

    pub fn selection(&self) -> &[UserId] {
        &self.selection
    }

    /// Flip a candidate in or out of the selection; false if not a candidate
    pub fn toggle(&mut self, uid: &UserId) -> bool {
        if !self.candidates().iter().any(|f| &f.uid == uid) {
            return false;
        }
        if let Some(pos) = self.selection.iter().position(|s| s == uid) {
            self.selection.remove(pos);
        } else {
            self.selection.push(uid.clone());
        }
        true
    }

    /// Fold the selection into the member list and write it back.
    ///
    /// Refused until the chat has loaded. The selection is cleared; a failed
    /// write is only logged.
    pub fn register(&mut self) -> Option<JoinHandle<()>> {
        let Some(chat) = self.chat.as_mut() else {
            warn!(chat_id = %self.chat_id, "Register before the member list loaded");
            return None;
        };

        let added = chat.register_members(self.selection.drain(..));

        let fields = chat.members_update();
        let store = self.ctx.store.clone();
        let chat_id = self.chat_id.clone();

        Some(tokio::spawn(async move {
            match store.update_document(Chat::COLLECTION, &chat_id, fields).await {
                Ok(()) => info!(%chat_id, added, "Chat members registered"),
                Err(e) => warn!(%chat_id, error = %e, "Failed to register chat members"),
            }
        }))
    }
}
