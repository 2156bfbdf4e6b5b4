//! Identity resolution consumed upstream of the real-time router.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::UserId;

/// Resolves user identities for the HTTP layer.
///
/// The hub never calls this; it only ever sees the [`UserId`] that was
/// established here before the WebSocket upgrade.
#[async_trait]
pub trait IdentityResolver: Send + Sync + 'static {
    /// Look up the username for a user id.
    ///
    /// Returns a `NotFound` error for unknown ids.
    async fn username_for_id(&self, user_id: UserId) -> AppResult<String>;

    /// Verify credentials and return the matching user id.
    ///
    /// Returns an `Authentication` error for an unknown user or a wrong password.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserId>;
}
