//! Error types for the session layer.

use aisandbox_protocol::ProtocolError;
use aisandbox_transport::TransportError;

/// Errors that end a session or reject a request to it.
///
/// Decode failures on individual server messages are not here: they are
/// logged and the message is skipped.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server could not be reached within the dial window.
    #[error("could not connect to the sandbox server: {0}")]
    Connect(#[source] TransportError),

    /// The server announced a protocol version this client does not speak.
    #[error("protocol version mismatch: server speaks {server}, client speaks {client}")]
    VersionMismatch {
        /// Version announced by the server.
        server: String,
        /// Version compiled into this client.
        client: String,
    },

    /// The connection failed or was closed mid-session.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message was rejected before it was queued.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The writer task is gone, so nothing more can be sent.
    #[error("session closed")]
    Closed,

    /// A session task panicked or was cancelled.
    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SessionError {
    /// Returns `true` if the session ended because the server hung up,
    /// as opposed to a failure on this side.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_closed())
    }
}
