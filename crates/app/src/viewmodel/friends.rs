//! Friend roster view model

use std::sync::Arc;

use natter_core::identity_code::{self, PixelMatrix};
use natter_core::{to_fields, DocumentStore, Friend, FriendLink, LiveList, Query, UserId};
use tracing::{info, warn};

use super::lookup::resolve_profile;
use crate::navigator::Screen;
use crate::session::Session;
use crate::state::AppContext;

/// Friend links owned by the current user
pub fn roster_query(session: &Session) -> Query {
    Query::collection(FriendLink::COLLECTION)
        .where_eq(FriendLink::OWNER, session.user_id().as_str())
}

/// Result of scanning an identity code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Cancelled,
    Scanned(UserId),
}

impl ScanOutcome {
    pub fn notice(&self) -> String {
        match self {
            ScanOutcome::Cancelled => "Cancelled".to_string(),
            ScanOutcome::Scanned(id) => format!("Scanned: {}", id),
        }
    }

    /// Screen to open next, if any
    pub fn next_screen(&self) -> Option<Screen> {
        match self {
            ScanOutcome::Cancelled => None,
            ScanOutcome::Scanned(id) => Some(Screen::AddFriend(id.clone())),
        }
    }
}

pub struct FriendRosterView {
    ctx: Arc<AppContext>,
    session: Session,
    friends: LiveList<Friend>,
}

impl FriendRosterView {
    pub fn mount(ctx: Arc<AppContext>, session: Session) -> Self {
        let friends = LiveList::mount(ctx.store.as_ref(), roster_query(&session));
        Self {
            ctx,
            session,
            friends,
        }
    }

    pub fn friends(&self) -> &[Friend] {
        self.friends.items()
    }

    pub fn is_live(&self) -> bool {
        self.friends.is_live()
    }

    pub fn pump(&mut self) -> bool {
        self.friends.pump()
    }

    /// Interpret a scanner payload; blank counts as cancelled
    pub fn scan_result(payload: Option<&str>) -> ScanOutcome {
        match payload.map(str::trim).filter(|p| !p.is_empty()) {
            Some(id) => ScanOutcome::Scanned(UserId::from(id)),
            None => ScanOutcome::Cancelled,
        }
    }

    /// Decode a scanned image
    pub fn scan_code(matrix: &PixelMatrix) -> ScanOutcome {
        Self::scan_result(identity_code::decode(matrix).as_deref())
    }

    /// Look up the friend's current name and write the link
    pub async fn add_friend(&self, friend: &UserId) {
        let profile = resolve_profile(self.ctx.store.as_ref(), friend).await;
        write_link(self.ctx.store.as_ref(), self.session.user_id(), friend, &profile.name).await;
    }
}

/// Write an owner -> friend link carrying the name as it is now
pub async fn write_link(store: &dyn DocumentStore, owner: &UserId, friend: &UserId, name: &str) {
    let link = FriendLink::new(owner.clone(), friend.clone(), name);
    let result = match to_fields(&link) {
        Ok(fields) => store.add_document(FriendLink::COLLECTION, fields).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(id) => info!(%owner, %friend, link_id = %id, "Friend added"),
        Err(e) => warn!(%owner, %friend, error = %e, "Failed to add friend"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewmodel::testing::{context, failing_writes, put_profile, session_with_profile};
    use natter_core::PLACEHOLDER_NAME;

    #[tokio::test]
    async fn test_friend_name_is_snapshotted() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let bob_doc = put_profile(&db, "u2", "Bob").await;
        let mut view = FriendRosterView::mount(ctx, session);

        view.add_friend(&UserId::from("u2")).await;
        view.pump();
        assert_eq!(view.friends().len(), 1);
        assert_eq!(view.friends()[0].uid.as_str(), "u2");
        assert_eq!(view.friends()[0].name, "Bob");

        // A later rename does not reach the existing link
        let mut rename = natter_core::Fields::new();
        rename.insert("name".to_string(), serde_json::json!("Robert"));
        db.update_document("users", &bob_doc, rename).await.unwrap();
        view.pump();
        assert_eq!(view.friends()[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_unknown_friend_gets_placeholder() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = FriendRosterView::mount(ctx, session);

        view.add_friend(&UserId::from("ghost")).await;
        view.pump();
        assert_eq!(view.friends()[0].name, PLACEHOLDER_NAME);
    }

    #[tokio::test]
    async fn test_roster_only_lists_own_links() {
        let (db, ctx) = context();
        let ann = session_with_profile(&db, "u1", "Ann").await;
        let bob = session_with_profile(&db, "u2", "Bob").await;
        let mut ann_view = FriendRosterView::mount(ctx.clone(), ann);
        let bob_view = FriendRosterView::mount(ctx, bob);

        bob_view.add_friend(&UserId::from("u1")).await;
        ann_view.pump();
        assert!(ann_view.friends().is_empty());
    }

    #[tokio::test]
    async fn test_failed_add_is_silent() {
        let (db, ctx) = failing_writes();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = FriendRosterView::mount(ctx, session);

        view.add_friend(&UserId::from("u2")).await;
        view.pump();
        assert!(view.friends().is_empty());
    }

    #[test]
    fn test_scan_outcomes() {
        assert_eq!(FriendRosterView::scan_result(None), ScanOutcome::Cancelled);
        assert_eq!(FriendRosterView::scan_result(Some("  ")), ScanOutcome::Cancelled);

        let scanned = FriendRosterView::scan_result(Some("u2"));
        assert_eq!(scanned.notice(), "Scanned: u2");
        assert_eq!(scanned.next_screen(), Some(Screen::AddFriend(UserId::from("u2"))));
        assert_eq!(ScanOutcome::Cancelled.notice(), "Cancelled");
    }

    #[test]
    fn test_scan_decodes_identity_code() {
        let matrix = identity_code::encode("u2", 400, 400).unwrap();
        assert_eq!(
            FriendRosterView::scan_code(&matrix),
            ScanOutcome::Scanned(UserId::from("u2"))
        );
    }
}
