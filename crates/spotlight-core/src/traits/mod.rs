//! Collaborator traits defined in `spotlight-core` and implemented by other crates.

pub mod identity;
pub mod message_log;

pub use identity::IdentityResolver;
pub use message_log::{MessageLog, StoredMessage};
