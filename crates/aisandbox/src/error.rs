//! Unified error type for the AI Sandbox client.

use aisandbox_model::NormalizeError;
use aisandbox_protocol::ProtocolError;
use aisandbox_session::SessionError;
use aisandbox_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `aisandbox` meta-crate you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum AiSandboxError {
    /// A transport-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid command).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A snapshot could not be linked.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// A session-level error (connect, version mismatch, closed).
    #[error(transparent)]
    Session(#[from] SessionError),
}
