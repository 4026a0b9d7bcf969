//! Data models for Natter

mod chat;
mod friend;
mod ids;
mod message;
mod user;

pub use chat::*;
pub use friend::*;
pub use ids::*;
pub use message::*;
pub use user::*;
