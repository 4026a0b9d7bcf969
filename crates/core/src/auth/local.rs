//! Local account provider backed by the SQLite database

use std::sync::{Arc, Mutex, PoisonError};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{normalize_email, AuthProvider, MIN_PASSWORD_LEN};
use crate::error::AuthError;
use crate::models::UserId;
use crate::storage::{Account, AccountStore, Database};

pub struct LocalAuth {
    db: Arc<Database>,
    min_password_len: usize,
    current: Mutex<Option<UserId>>,
}

impl LocalAuth {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_min_password_len(db, MIN_PASSWORD_LEN)
    }

    pub fn with_min_password_len(db: Arc<Database>, min_password_len: usize) -> Self {
        Self {
            db,
            min_password_len,
            current: Mutex::new(None),
        }
    }

    fn set_current(&self, user_id: Option<UserId>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = user_id;
    }

    fn find_account(&self, email: &str) -> Result<Option<Account>, AuthError> {
        self.db
            .with_conn(|conn| AccountStore::new(conn).find_by_email(email))
            .map_err(|e| AuthError::Backend(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    #[instrument(skip(self, password))]
    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let email = normalize_email(email)?;

        if password.chars().count() < self.min_password_len {
            return Err(AuthError::WeakPassword {
                min: self.min_password_len,
            });
        }

        if self.find_account(&email)?.is_some() {
            return Err(AuthError::AccountExists);
        }

        // Hash password
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Backend(format!("failed to hash password: {}", e)))?
            .to_string();

        let account = Account::new(email, password_hash);
        self.db
            .with_conn(|conn| AccountStore::new(conn).create(&account))
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        info!(user_id = %account.id, "Account created");
        self.set_current(Some(account.id.clone()));
        Ok(account.id)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let email = normalize_email(email)?;

        let account = self
            .find_account(&email)?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|_| AuthError::Backend("invalid stored password".to_string()))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(AuthError::InvalidCredentials);
        }

        if let Err(e) = self
            .db
            .with_conn(|conn| AccountStore::new(conn).update_last_login(&account.id))
        {
            warn!(error = %e, "Failed to record last login");
        }

        info!(user_id = %account.id, "Signed in");
        self.set_current(Some(account.id.clone()));
        Ok(account.id)
    }

    async fn sign_out(&self) {
        self.set_current(None);
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> LocalAuth {
        LocalAuth::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_create_account_signs_in() {
        let auth = auth();
        let id = auth.create_account("ann@example.com", "secret1").await.unwrap();
        assert_eq!(auth.current_user_id(), Some(id));
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() {
        let auth = auth();
        auth.create_account("ann@example.com", "secret1").await.unwrap();
        let err = auth
            .create_account("ANN@example.com", "secret2")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::AccountExists);
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let auth = auth();
        let err = auth.create_account("ann@example.com", "123").await.unwrap_err();
        assert_eq!(err, AuthError::WeakPassword { min: MIN_PASSWORD_LEN });
        assert!(auth.current_user_id().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let auth = auth();
        let id = auth.create_account("ann@example.com", "secret1").await.unwrap();
        auth.sign_out().await;
        assert!(auth.current_user_id().is_none());

        assert_eq!(
            auth.sign_in("ann@example.com", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.sign_in("bob@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        );

        let signed_in = auth.sign_in(" ann@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in, id);
        assert_eq!(auth.current_user_id(), Some(id));
    }
}
