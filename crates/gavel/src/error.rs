//! Unified error type for Gavel.

use gavel_market::MarketError;
use gavel_protocol::{ErrorKind, Failure, ProtocolError};
use gavel_session::SessionError;
use gavel_store::StoreError;

/// Top-level error that wraps every crate-specific error.
///
/// Callers of [`crate::Marketplace`] deal with this one type; `#[from]`
/// lets `?` convert the layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GavelError {
    /// The request bytes couldn't be decoded, or a reply couldn't be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Token missing, invalid or expired; bad login; not the owner.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Not found, bid rejected, wrong auction state.
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GavelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(e) => e.kind(),
            Self::Session(e) => e.kind(),
            Self::Market(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    /// The message to show an end user.
    ///
    /// Server-side failures get a fixed message; their details belong in
    /// the logs, not in replies.
    pub fn message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Converts into the encodable failure envelope.
    pub fn to_failure(&self) -> Failure {
        Failure::new(self.kind(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use gavel_protocol::AuctionId;

    use super::*;

    #[test]
    fn test_from_session_error_keeps_message() {
        let err: GavelError = SessionError::ExpiredSession.into();
        assert!(matches!(err, GavelError::Session(_)));
        assert_eq!(err.kind(), ErrorKind::ExpiredSession);
        assert_eq!(err.message(), "Expired session");
    }

    #[test]
    fn test_from_market_error() {
        let err: GavelError = MarketError::AuctionNotFound(AuctionId(1)).into();
        assert!(matches!(err, GavelError::Market(_)));
        assert_eq!(err.to_failure(), Failure::new(ErrorKind::NotFound, "Auction not found"));
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err: GavelError = StoreError::Unavailable("connection refused".into()).into();

        let failure = err.to_failure();

        assert_eq!(failure.code, 500);
        assert_eq!(failure.message, "Internal error");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_from_protocol_error_is_bad_request() {
        let err: GavelError = ProtocolError::InvalidMessage("empty body".into()).into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_failure().code, 400);
    }
}
