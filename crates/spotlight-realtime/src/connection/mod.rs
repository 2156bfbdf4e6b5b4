//! Per-connection handles and session lifecycle.

pub mod handle;
pub mod session;
