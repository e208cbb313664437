//! Error types for the session layer.

use gavel_protocol::{ErrorKind, UserId};
use gavel_store::StoreError;

/// Errors raised while authenticating a caller or checking ownership.
///
/// The `#[error]` strings are the messages end users see, so they stay
/// short and never say which half of a login was wrong.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A guarded operation was called without a token.
    #[error("Missing session id")]
    MissingToken,

    /// The token doesn't match any session (never issued, or logged out).
    #[error("Invalid session")]
    InvalidSession,

    /// The session exists but its expiry has passed.
    #[error("Expired session")]
    ExpiredSession,

    /// Unknown username or wrong credential.
    #[error("Incorrect username or password")]
    AuthenticationFailed,

    /// The caller is logged in but doesn't own the resource.
    #[error("user {user} is not the owner ({owner}) of this resource")]
    Forbidden { user: UserId, owner: UserId },

    /// The session or user repository failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingToken => ErrorKind::MissingToken,
            Self::InvalidSession => ErrorKind::InvalidSession,
            Self::ExpiredSession => ErrorKind::ExpiredSession,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Store(e) => e.kind(),
        }
    }
}
