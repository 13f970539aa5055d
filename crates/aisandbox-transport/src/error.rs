/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Dialing the server failed for the whole retry window.
    #[error("failed to connect to {addr} after {attempts} attempt(s): {source}")]
    ConnectFailed {
        /// The address that was dialed.
        addr: String,
        /// How many connection attempts were made.
        attempts: u32,
        /// The error returned by the last attempt.
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}

impl TransportError {
    /// Returns `true` if the peer closed the stream (as opposed to an
    /// I/O failure).
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_))
    }
}
