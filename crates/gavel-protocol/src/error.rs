//! Error types for the protocol layer, plus the shared failure taxonomy.
//!
//! Each crate in Gavel defines its own error enum. [`ErrorKind`] is the
//! one thing they all agree on: every error, whichever crate raised it,
//! classifies itself into one of these kinds so the command layer can
//! encode it uniformly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, an
    /// unknown `op`, or a value of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but is not acceptable as a request.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Protocol errors are always the caller's fault.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BadRequest
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// The classification every failure is surfaced under.
///
/// The four session-related kinds all surface as "unauthorized" but stay
/// distinct so clients can tell a missing header from a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A guarded operation arrived without a session token.
    MissingToken,
    /// The token does not name any known session.
    InvalidSession,
    /// The session exists but its expiry has passed.
    ExpiredSession,
    /// Login failed. Never says which half of the credentials was wrong.
    AuthenticationFailed,
    /// Authenticated, but not allowed to touch this resource.
    Forbidden,
    /// A referenced user, item, or auction does not exist.
    NotFound,
    /// The operation does not fit the auction's lifecycle state.
    InvalidState,
    /// The bid price breaks the ordering rule.
    InvalidBid,
    /// The request itself could not be understood.
    BadRequest,
    /// A uniqueness rule in storage was violated (duplicate username).
    Conflict,
    /// Something on the server side failed; not the caller's fault.
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::MissingToken
            | Self::InvalidSession
            | Self::ExpiredSession
            | Self::AuthenticationFailed => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InvalidState | Self::InvalidBid | Self::BadRequest => 400,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }

    /// Returns `true` for the kinds that mean "who are you?" rather than
    /// "you can't do that".
    pub fn is_unauthorized(self) -> bool {
        self.status_code() == 401
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingToken => "missing_token",
            Self::InvalidSession => "invalid_session",
            Self::ExpiredSession => "expired_session",
            Self::AuthenticationFailed => "authentication_failed",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::InvalidBid => "invalid_bid",
            Self::BadRequest => "bad_request",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}
