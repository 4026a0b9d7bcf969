//! Authentication
//!
//! Screens only see [`AuthProvider`]. [`LocalAuth`] keeps accounts in the
//! local database; a hosted identity service can be plugged in instead.

mod local;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::models::UserId;

pub use local::LocalAuth;

/// Default minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Operations consumed from the auth provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in
    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    async fn sign_out(&self);

    fn current_user_id(&self) -> Option<UserId>;
}

/// Trim and lowercase an email, rejecting obviously malformed ones
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(AuthError::InvalidEmail),
    }
}
