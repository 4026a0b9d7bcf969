//! Error types for Natter Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Missing navigation parameter: {0}")]
    MissingNavigationParameter(&'static str),

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Identity code error: {0}")]
    IdentityCode(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by an auth provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("The email address is badly formatted")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("The email address is already in use by another account")]
    AccountExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Auth backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
