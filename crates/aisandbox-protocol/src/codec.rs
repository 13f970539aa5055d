//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between Rust types and the raw bytes of one frame.
//! Everything above the transport goes through the [`Codec`] trait, so the
//! session never calls `serde_json` directly.
//!
//! The sandbox wraps every structured value in an [`Envelope`]; the
//! provided `*_envelope` methods do the wrapping and the class check.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Envelope, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the reader and
/// writer tasks for the whole session.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Wraps `value` in an envelope of the given class and encodes it.
    ///
    /// # Errors
    /// Same as [`encode`](Self::encode).
    fn encode_envelope<T: Serialize>(
        &self,
        class: &str,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        self.encode(&Envelope::new(class, value))
    }

    /// Decodes an envelope and returns its value, checking the class.
    ///
    /// # Errors
    /// - `ProtocolError::Decode` if the frame is not a well-formed envelope
    ///   around a `T`.
    /// - [`ProtocolError::UnexpectedClass`] if `__class__` differs from
    ///   `class`.
    fn decode_envelope<T: DeserializeOwned>(
        &self,
        data: &[u8],
        class: &str,
    ) -> Result<T, ProtocolError> {
        let envelope: Envelope<T> = self.decode(data)?;
        envelope.into_class(class)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`). This is the only format
/// the sandbox server speaks.
///
/// `serde_json` writes compact output, so an encoded value never contains
/// a raw newline (newlines inside strings are escaped).
///
/// ## Example
///
/// ```rust
/// use aisandbox_protocol::{Codec, JsonCodec, ServerConnect};
///
/// let codec = JsonCodec;
/// let frame = br#"{"__class__": "ConnectServer", "__value__": {"protocolVersion": "1.2"}}"#;
///
/// let hello: ServerConnect = codec.decode_envelope(frame, ServerConnect::CLASS).unwrap();
/// assert_eq!(hello.protocol_version, "1.2");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{LevelInfo, ServerConnect};

    #[test]
    fn test_encode_envelope_shape() {
        let bytes = JsonCodec
            .encode_envelope("Thing", &serde_json::json!({"a": 1}))
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["__class__"], "Thing");
        assert_eq!(json["__value__"]["a"], 1);
    }

    #[test]
    fn test_encoded_bytes_contain_no_newline() {
        let bytes = JsonCodec
            .encode_envelope("Thing", &"line one\nline two")
            .unwrap();
        assert!(!bytes.contains(&b'\n'));
    }

    #[test]
    fn test_decode_envelope_checks_class() {
        let frame = br#"{"__class__": "GameInfo", "__value__": {"protocolVersion": "1.2"}}"#;
        let err = JsonCodec
            .decode_envelope::<ServerConnect>(frame, ServerConnect::CLASS)
            .unwrap_err();
        match err {
            ProtocolError::UnexpectedClass { expected, actual } => {
                assert_eq!(expected, "ConnectServer");
                assert_eq!(actual, "GameInfo");
            }
            other => panic!("expected UnexpectedClass, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let err = JsonCodec
            .decode_envelope::<LevelInfo>(b"not json at all", LevelInfo::CLASS)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_decode_missing_value_returns_decode_error() {
        let err = JsonCodec
            .decode_envelope::<ServerConnect>(
                br#"{"__class__": "ConnectServer"}"#,
                ServerConnect::CLASS,
            )
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }
}
