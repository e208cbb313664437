//! Codec trait and implementations for turning requests and replies into
//! bytes.
//!
//! The command layer doesn't care HOW messages are serialized, only that
//! something implements [`Codec`]. [`JsonCodec`] is the one shipped today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a codec can live inside shared,
/// long-lived service state.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ```rust
/// use gavel_protocol::{Codec, Command, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let request = Request::public(Command::ListAuctions);
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: Request = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{AuctionId, Command, ErrorKind, Failure, Reply, Request};

    #[test]
    fn test_decode_place_bid_request() {
        let raw = br#"{"token":"abc","command":{"op":"place_bid","auction_id":4,"price":25}}"#;

        let req: Request = JsonCodec.decode(raw).expect("should decode");

        assert_eq!(req.token.as_deref(), Some("abc"));
        assert_eq!(
            req.command,
            Command::PlaceBid {
                auction_id: AuctionId(4),
                price: 25
            }
        );
    }

    #[test]
    fn test_decode_unknown_op_returns_decode_error() {
        let raw = br#"{"command":{"op":"buy_now","auction_id":4}}"#;

        let result: Result<Request, _> = JsonCodec.decode(raw);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_negative_price_is_rejected() {
        let raw = br#"{"command":{"op":"place_bid","auction_id":4,"price":-1}}"#;

        let result: Result<Request, _> = JsonCodec.decode(raw);

        assert!(result.is_err(), "prices are unsigned");
    }

    #[test]
    fn test_encode_failure_reply_shape() {
        let reply = Reply::Failure(Failure::new(ErrorKind::MissingToken, "Missing session id"));

        let bytes = JsonCodec.encode(&reply).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["type"], "Failure");
        assert_eq!(json["data"]["kind"], "missing_token");
        assert_eq!(json["data"]["code"], 401);
        assert_eq!(json["data"]["message"], "Missing session id");
    }
}
