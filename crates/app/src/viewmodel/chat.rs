//! Chat session view model

use std::sync::Arc;

use natter_core::invariants::assert_messages_ordered;
use natter_core::{to_fields, Chat, ChatId, Direction, LiveList, Message, Query, UserProfile};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::lookup::resolve_profile;
use crate::navigator::Screen;
use crate::session::Session;
use crate::state::AppContext;

/// Whole message history of a chat, oldest first
pub fn messages_query(chat_id: &ChatId) -> Query {
    Query::collection(Chat::messages_path(chat_id))
        .order_by(Message::SENT_AT, Direction::Ascending)
}

pub struct ChatSessionView {
    ctx: Arc<AppContext>,
    session: Session,
    chat_id: ChatId,
    sender: UserProfile,
    input: String,
    messages: LiveList<Message>,
}

impl ChatSessionView {
    pub fn mount(ctx: Arc<AppContext>, session: Session, chat_id: ChatId) -> Self {
        let messages = LiveList::mount(ctx.store.as_ref(), messages_query(&chat_id));
        let sender = UserProfile::placeholder(session.user_id().clone());
        Self {
            ctx,
            session,
            chat_id,
            sender,
            input: String::new(),
            messages,
        }
    }

    /// Resolve the sender name attached to outgoing messages
    pub async fn load(&mut self) {
        self.sender = resolve_profile(self.ctx.store.as_ref(), self.session.user_id()).await;
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn sender_name(&self) -> &str {
        &self.sender.name
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn messages(&self) -> &[Message] {
        self.messages.items()
    }

    pub fn is_live(&self) -> bool {
        self.messages.is_live()
    }

    pub fn pump(&mut self) -> bool {
        let replaced = self.messages.pump();
        assert_messages_ordered(self.messages.items());
        replaced
    }

    /// Send the input buffer.
    ///
    /// Blank input is left untouched and nothing is written. Otherwise the
    /// buffer is cleared as the write is issued; a failed write is only logged.
    pub fn send(&mut self) -> Option<JoinHandle<()>> {
        if self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        let sender = UserProfile::new(self.session.user_id().clone(), self.sender.name.clone());
        let message = Message::compose(&sender, text, self.ctx.clock.now());
        let path = Chat::messages_path(&self.chat_id);
        let store = self.ctx.store.clone();

        Some(tokio::spawn(async move {
            let result = match to_fields(&message) {
                Ok(fields) => store.add_document(&path, fields).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(id) => debug!(%path, message_id = %id, "Message sent"),
                Err(e) => warn!(%path, error = %e, "Failed to send message"),
            }
        }))
    }

    /// Route of the membership editor for this chat
    pub fn members_route(&self) -> String {
        Screen::AddFriendToChat(self.chat_id.clone()).route()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewmodel::testing::{
        context, context_with_clock, failing_writes, session_with_profile, ManualClock,
    };
    use chrono::Duration;
    use natter_core::DocumentStore;

    #[tokio::test]
    async fn test_blank_send_is_noop() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let chat_id = ChatId::from("c1");
        let mut view = ChatSessionView::mount(ctx, session, chat_id.clone());

        view.set_input("   ");
        assert!(view.send().is_none());
        assert_eq!(view.input(), "   ");

        let docs = db.get_once(&messages_query(&chat_id)).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_send_writes_message_and_clears_input() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = ChatSessionView::mount(ctx, session, ChatId::from("c1"));
        view.load().await;

        view.set_input("hello");
        let handle = view.send().unwrap();
        assert_eq!(view.input(), "");
        handle.await.unwrap();

        view.pump();
        assert_eq!(view.messages().len(), 1);
        let msg = &view.messages()[0];
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.sender_name, "Ann");
        assert_eq!(msg.sender_id.as_str(), "u1");
    }

    #[tokio::test]
    async fn test_input_cleared_even_when_write_fails() {
        let (db, ctx) = failing_writes();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = ChatSessionView::mount(ctx, session, ChatId::from("c1"));

        view.set_input("lost");
        let handle = view.send().unwrap();
        assert_eq!(view.input(), "");
        handle.await.unwrap();

        view.pump();
        assert!(view.messages().is_empty());
    }

    #[tokio::test]
    async fn test_messages_render_by_timestamp() {
        let clock = ManualClock::new();
        let (db, ctx) = context_with_clock(clock.clone());
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = ChatSessionView::mount(ctx, session, ChatId::from("c1"));

        // "there" is stamped later but written first
        clock.advance(Duration::seconds(5));
        view.set_input("there");
        view.send().unwrap().await.unwrap();
        clock.rewind(Duration::seconds(3));
        view.set_input("hi");
        view.send().unwrap().await.unwrap();

        view.pump();
        let texts: Vec<_> = view.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "there"]);
    }

    #[tokio::test]
    async fn test_other_chats_are_not_shown() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut here = ChatSessionView::mount(ctx.clone(), session.clone(), ChatId::from("c1"));
        let mut there = ChatSessionView::mount(ctx, session, ChatId::from("c2"));

        there.set_input("elsewhere");
        there.send().unwrap().await.unwrap();

        here.pump();
        there.pump();
        assert!(here.messages().is_empty());
        assert_eq!(there.messages().len(), 1);
    }

    #[test]
    fn test_members_route() {
        let (_db, ctx) = context();
        let view = ChatSessionView::mount(ctx, Session::new("u1".into()), ChatId::from("c1"));
        assert_eq!(view.members_route(), "addFriendToChat/c1");
    }
}
