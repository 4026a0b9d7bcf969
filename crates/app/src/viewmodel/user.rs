//! User detail view model

use std::sync::Arc;

use natter_core::{DocumentId, Fields, UserProfile, PLACEHOLDER_NAME};
use serde_json::Value;
use tracing::{info, warn};

use super::lookup::find_profile;
use crate::session::Session;
use crate::state::AppContext;

/// Editable display name of the signed-in user
pub struct UserDetailView {
    ctx: Arc<AppContext>,
    session: Session,
    document_id: Option<DocumentId>,
    pub name: String,
    notice: Option<String>,
}

impl UserDetailView {
    pub fn new(ctx: Arc<AppContext>, session: Session) -> Self {
        Self {
            ctx,
            session,
            document_id: None,
            name: String::new(),
            notice: None,
        }
    }

    /// Read the profile document holding the name
    pub async fn load(&mut self) {
        match find_profile(self.ctx.store.as_ref(), self.session.user_id()).await {
            Ok(Some(record)) => {
                self.document_id = Some(record.document_id);
                self.name = record.profile.name;
            }
            Ok(None) => {
                warn!(uid = %self.session.user_id(), "No profile document to edit");
                self.name = PLACEHOLDER_NAME.to_string();
            }
            Err(e) => {
                warn!(uid = %self.session.user_id(), error = %e, "Profile lookup failed");
                self.name = PLACEHOLDER_NAME.to_string();
            }
        }
    }

    pub fn user_id(&self) -> &str {
        self.session.user_id().as_str()
    }

    pub fn is_loaded(&self) -> bool {
        self.document_id.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Store the edited name. Does nothing until the profile has loaded.
    pub async fn apply(&mut self) {
        let Some(id) = self.document_id.clone() else {
            return;
        };

        let mut fields = Fields::new();
        fields.insert(UserProfile::NAME.to_string(), Value::String(self.name.clone()));

        match self
            .ctx
            .store
            .update_document(UserProfile::COLLECTION, &id, fields)
            .await
        {
            Ok(()) => {
                info!(uid = %self.session.user_id(), "Display name updated");
                self.notice = Some("Name updated".to_string());
            }
            Err(e) => {
                warn!(uid = %self.session.user_id(), error = %e, "Failed to update display name");
                self.notice = Some("Name update failed".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewmodel::lookup::resolve_profile;
    use crate::viewmodel::testing::{context, failing_writes, session_with_profile};

    #[tokio::test]
    async fn test_apply_renames() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = UserDetailView::new(ctx, session.clone());
        view.load().await;
        assert_eq!(view.name, "Ann");

        view.name = "Annie".to_string();
        view.apply().await;
        assert_eq!(view.notice(), Some("Name updated"));

        let profile = resolve_profile(db.as_ref(), session.user_id()).await;
        assert_eq!(profile.name, "Annie");
    }

    #[tokio::test]
    async fn test_apply_before_load_is_noop() {
        let (db, ctx) = context();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = UserDetailView::new(ctx, session.clone());

        view.name = "Zed".to_string();
        view.apply().await;
        assert!(view.notice().is_none());
        assert_eq!(resolve_profile(db.as_ref(), session.user_id()).await.name, "Ann");
    }

    #[tokio::test]
    async fn test_missing_profile_stays_unloaded() {
        let (_db, ctx) = context();
        let mut view = UserDetailView::new(ctx, Session::new("ghost".into()));
        view.load().await;
        assert!(!view.is_loaded());
        assert_eq!(view.name, PLACEHOLDER_NAME);
    }

    #[tokio::test]
    async fn test_failed_update_is_reported() {
        let (db, ctx) = failing_writes();
        let session = session_with_profile(&db, "u1", "Ann").await;
        let mut view = UserDetailView::new(ctx, session);
        view.load().await;

        view.name = "Annie".to_string();
        view.apply().await;
        assert_eq!(view.notice(), Some("Name update failed"));
    }
}
