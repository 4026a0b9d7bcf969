//! Natter Core Library
//!
//! Models, the document store and auth interfaces with their SQLite
//! backends, identity codes, and configuration for the Natter chat client.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity_code;
pub mod invariants;
pub mod models;
pub mod storage;
pub mod store;

pub use auth::{AuthProvider, LocalAuth};
pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use error::{AuthError, Error, Result};
pub use identity_code::PixelMatrix;
pub use models::*;
pub use storage::Database;
pub use store::{
    to_fields, Direction, Document, DocumentStore, Fields, LiveList, Query, Record, Subscription,
};
