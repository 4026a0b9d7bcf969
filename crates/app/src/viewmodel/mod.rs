//! Screen view models
//!
//! Each view mounts its subscriptions when constructed and releases them when
//! dropped. Views take the [`crate::state::AppContext`] and the signed-in
//! [`crate::session::Session`] explicitly.

pub mod add_friend;
pub mod auth;
pub mod chat;
pub mod friends;
pub mod home;
pub mod lookup;
pub mod members;
pub mod qrcode;
pub mod user;

pub use add_friend::AddFriendView;
pub use auth::LoginView;
pub use chat::ChatSessionView;
pub use friends::FriendRosterView;
pub use home::HomeView;
pub use members::MembershipEditor;
pub use qrcode::QrCodeView;
pub use user::UserDetailView;
