//! # spotlight-database
//!
//! PostgreSQL connection management and the concrete repositories behind
//! the collaborator traits in `spotlight-core`: the direct-message log and
//! identity resolution.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MessageRepository, UserRepository};
