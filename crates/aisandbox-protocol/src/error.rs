//! Error types for the protocol layer.
//!
//! A `ProtocolError` always concerns a single message: it is the reason one
//! frame could not be encoded or decoded. The session treats it as
//! recoverable, logging it and moving on to the next frame.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, wrong data
    /// types, or a payload line that was cut short.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope decoded, but its `__class__` is not the one the
    /// protocol expects at this point.
    #[error("unexpected envelope class: expected {expected}, got {actual}")]
    UnexpectedClass {
        /// The class the caller asked for.
        expected: String,
        /// The class found on the wire.
        actual: String,
    },

    /// The message is invalid at the protocol level.
    ///
    /// This is for logical errors that pass deserialization but violate
    /// protocol rules, such as a command without targets.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
