//! Login view model

use natter_core::{to_fields, UserId, UserProfile};
use tracing::{info, warn};

use crate::session::Session;
use crate::state::AppContext;

/// Email/password form with sign-up and login actions
#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    notice: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transient message from the last action
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Create an account, write its placeholder profile, and sign it in
    pub async fn sign_up(&mut self, ctx: &AppContext) -> Option<Session> {
        match ctx.auth.create_account(&self.email, &self.password).await {
            Ok(uid) => {
                info!(%uid, "Account created");
                write_placeholder_profile(ctx, &uid).await;
                self.password.clear();
                self.notice = Some(format!("Sign up succeeded: UID = {}", uid));
                Some(Session::new(uid))
            }
            Err(e) => {
                warn!(error = %e, "Sign up failed");
                self.notice = Some(format!("Sign up failed: {}", e));
                None
            }
        }
    }

    pub async fn sign_in(&mut self, ctx: &AppContext) -> Option<Session> {
        match ctx.auth.sign_in(&self.email, &self.password).await {
            Ok(uid) => {
                info!(%uid, "Signed in");
                self.password.clear();
                self.notice = Some(format!("Login succeeded: {}", uid));
                Some(Session::new(uid))
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.notice = Some(format!("Login failed: {}", e));
                None
            }
        }
    }
}

async fn write_placeholder_profile(ctx: &AppContext, uid: &UserId) {
    let result = match to_fields(&UserProfile::placeholder(uid.clone())) {
        Ok(fields) => ctx.store.add_document(UserProfile::COLLECTION, fields).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        warn!(%uid, error = %e, "Failed to write profile for new account");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewmodel::lookup::find_profile;
    use crate::viewmodel::testing::context;
    use natter_core::PLACEHOLDER_NAME;

    fn form(email: &str, password: &str) -> LoginView {
        LoginView {
            email: email.to_string(),
            password: password.to_string(),
            ..LoginView::default()
        }
    }

    #[tokio::test]
    async fn test_sign_up_writes_placeholder_profile() {
        let (db, ctx) = context();
        let mut view = form("ann@example.com", "secret1");

        let session = view.sign_up(&ctx).await.unwrap();
        let uid = session.user_id().clone();
        assert_eq!(
            view.notice(),
            Some(format!("Sign up succeeded: UID = {}", uid).as_str())
        );
        assert!(view.password.is_empty());

        let record = find_profile(db.as_ref(), &uid).await.unwrap().unwrap();
        assert_eq!(record.profile.name, PLACEHOLDER_NAME);
        assert_eq!(ctx.auth.current_user_id(), Some(uid));
    }

    #[tokio::test]
    async fn test_sign_in_after_sign_up() {
        let (_db, ctx) = context();
        let created = form("ann@example.com", "secret1")
            .sign_up(&ctx)
            .await
            .unwrap();

        let mut view = form("ANN@example.com", "secret1");
        let session = view.sign_in(&ctx).await.unwrap();
        assert_eq!(session, created);
        assert_eq!(
            view.notice(),
            Some(format!("Login succeeded: {}", created.user_id()).as_str())
        );
    }

    #[tokio::test]
    async fn test_failures_leave_a_notice() {
        let (_db, ctx) = context();

        let mut weak = form("ann@example.com", "123");
        assert!(weak.sign_up(&ctx).await.is_none());
        assert!(weak.notice().unwrap().starts_with("Sign up failed: "));
        assert_eq!(weak.password, "123");

        let mut unknown = form("bob@example.com", "secret1");
        assert!(unknown.sign_in(&ctx).await.is_none());
        assert!(unknown.notice().unwrap().starts_with("Login failed: "));
    }
}
