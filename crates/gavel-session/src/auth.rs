//! Ownership checks.
//!
//! Session validation says WHO is calling; [`AuthorizationGuard`] says
//! whether that caller may change a particular resource. The rule is the
//! same for auctions and items: only the owner may.

use gavel_protocol::{Session, UserId};

use crate::SessionError;

/// Decides allow/deny for resource mutations.
///
/// Stateless, so it's `Copy` and every component can hold its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Allows the call only if `session` belongs to `owner`.
    ///
    /// # Errors
    /// [`SessionError::Forbidden`] when the session's user is anyone else.
    pub fn require_owner(&self, session: &Session, owner: UserId) -> Result<(), SessionError> {
        if session.user_id == owner {
            return Ok(());
        }
        tracing::debug!(user_id = %session.user_id, %owner, "ownership check failed");
        Err(SessionError::Forbidden {
            user: session.user_id,
            owner,
        })
    }
}
