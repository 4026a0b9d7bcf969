//! Home screen view model

use std::sync::Arc;

use natter_core::invariants::assert_chat_invariants;
use natter_core::{to_fields, Chat, ChatId, ChatSummary, LiveList, Query};
use tracing::{info, warn};

use super::lookup::resolve_profile;
use crate::session::Session;
use crate::state::AppContext;

/// Chats the current user belongs to
pub fn chats_query(session: &Session) -> Query {
    Query::collection(Chat::COLLECTION)
        .where_array_contains(Chat::MEMBERS, session.user_id().as_str())
}

/// Chat list plus the welcome line
pub struct HomeView {
    ctx: Arc<AppContext>,
    session: Session,
    name: Option<String>,
    chats: LiveList<ChatSummary>,
}

impl HomeView {
    pub fn mount(ctx: Arc<AppContext>, session: Session) -> Self {
        let chats = LiveList::mount(ctx.store.as_ref(), chats_query(&session));
        Self {
            ctx,
            session,
            name: None,
            chats,
        }
    }

    /// Resolve the display name for the welcome line
    pub async fn load(&mut self) {
        let profile = resolve_profile(self.ctx.store.as_ref(), self.session.user_id()).await;
        self.name = Some(profile.name);
    }

    pub fn welcome(&self) -> String {
        match &self.name {
            Some(name) => format!("Welcome {}", name),
            None => "Welcome".to_string(),
        }
    }

    pub fn chats(&self) -> &[ChatSummary] {
        self.chats.items()
    }

    /// False once the chat list stopped receiving updates
    pub fn is_live(&self) -> bool {
        self.chats.is_live()
    }

    pub fn pump(&mut self) -> bool {
        self.chats.pump()
    }

    /// Write a new chat with the current user as sole member
    pub async fn create_chat(&self) -> Option<ChatId> {
        let chat = Chat::new(self.session.user_id().clone());
        assert_chat_invariants(&chat);

        let result = match to_fields(&chat) {
            Ok(fields) => self.ctx.store.add_document(Chat::COLLECTION, fields).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(id) => {
                info!(chat_id = %id, owner = %chat.owner, "Chat created");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to create chat");
                None
            }
        }
    }
}
