//! # spotlight-auth
//!
//! Credential handling for SpotLight. Passwords are stored as Argon2id PHC
//! strings and verified here on login; the verified user id is what the
//! HTTP layer later hands to the WebSocket upgrade.

pub mod password;

pub use password::hasher::PasswordHasher;
