//! Inbound frame validation.

use thiserror::Error;
use tracing::warn;

use spotlight_core::types::id::UserId;

use super::types::{ChatMessage, InboundFrame};

/// Why an inbound frame was skipped. None of these close the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameRejection {
    /// `to` was absent or zero.
    #[error("frame has no recipient")]
    MissingRecipient,
    /// `content` was absent or empty.
    #[error("frame has empty content")]
    EmptyContent,
    /// The raw frame exceeded the configured size limit.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge {
        /// Size of the raw frame.
        size: usize,
        /// Configured limit.
        limit: usize,
    },
    /// The hub's routing queue was saturated.
    #[error("message hub is saturated")]
    HubBusy,
}

/// Check the raw frame size before decoding.
pub fn check_frame_size(raw: &str, limit: usize) -> Result<(), FrameRejection> {
    if raw.len() > limit {
        return Err(FrameRejection::TooLarge {
            size: raw.len(),
            limit,
        });
    }
    Ok(())
}

/// Turn a decoded frame into a routable message.
///
/// `from` is always the authenticated identity of the connection. A client
/// declaring a different sender is logged and overridden.
pub fn normalize_frame(
    frame: InboundFrame,
    authenticated: UserId,
) -> Result<ChatMessage, FrameRejection> {
    if let Some(declared) = frame.from {
        if declared.is_valid() && declared != authenticated {
            warn!(
                user_id = %authenticated,
                declared_from = %declared,
                "Client declared a foreign sender; overriding"
            );
        }
    }

    if !frame.to.is_valid() {
        return Err(FrameRejection::MissingRecipient);
    }

    if frame.content.is_empty() {
        return Err(FrameRejection::EmptyContent);
    }

    Ok(ChatMessage::new(authenticated, frame.to, frame.content))
}
