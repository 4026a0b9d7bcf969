//! Add-friend confirmation view model

use std::sync::Arc;

use natter_core::UserId;
use tokio::task::JoinHandle;

use super::friends::write_link;
use super::lookup::resolve_profile;
use crate::session::Session;
use crate::state::AppContext;

/// Shows a scanned user's name and adds them on confirmation
pub struct AddFriendView {
    ctx: Arc<AppContext>,
    session: Session,
    friend: UserId,
    name: Option<String>,
}

impl AddFriendView {
    pub fn new(ctx: Arc<AppContext>, session: Session, friend: UserId) -> Self {
        Self {
            ctx,
            session,
            friend,
            name: None,
        }
    }

    pub async fn load(&mut self) {
        let profile = resolve_profile(self.ctx.store.as_ref(), &self.friend).await;
        self.name = Some(profile.name);
    }

    pub fn friend(&self) -> &UserId {
        &self.friend
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Issue the link write; the caller leaves the screen without waiting
    pub fn add(&self) -> JoinHandle<()> {
        let store = self.ctx.store.clone();
        let owner = self.session.user_id().clone();
        let friend = self.friend.clone();
        let known_name = self.name.clone();

        tokio::spawn(async move {
            let name = match known_name {
                Some(name) => name,
                None => resolve_profile(store.as_ref(), &friend).await.name,
            };
            write_link(store.as_ref(), &owner, &friend, &name).await;
        })
    }
}
