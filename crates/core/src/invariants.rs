//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::{Chat, Message};

/// Validate that a chat's member list is well formed
pub fn assert_chat_invariants(chat: &Chat) {
    debug_assert!(
        chat.is_member(&chat.owner),
        "Chat owned by {} does not list its owner as a member",
        chat.owner
    );

    for (i, member) in chat.members.iter().enumerate() {
        debug_assert!(
            !chat.members[..i].contains(member),
            "Chat owned by {} lists member {} twice",
            chat.owner,
            member
        );
    }
}

/// Validate that messages are in display order
pub fn assert_messages_ordered(messages: &[Message]) {
    for pair in messages.windows(2) {
        debug_assert!(
            pair[0].sent_at <= pair[1].sent_at,
            "Message at {} displayed before earlier message at {}",
            pair[0].sent_at,
            pair[1].sent_at
        );
    }
}
