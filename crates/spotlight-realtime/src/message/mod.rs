//! WebSocket message types and inbound frame validation.

pub mod types;
pub mod validator;

pub use types::{ChatMessage, InboundFrame};
pub use validator::{FrameRejection, normalize_frame};
