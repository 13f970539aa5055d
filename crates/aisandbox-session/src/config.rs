//! Session configuration.

pub use aisandbox_transport::DialConfig;

/// Configuration for one session.
///
/// Every field has a working default, so `SessionConfig::default()` plus a
/// commander name is usually all a bot needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name reported to the server in the handshake.
    ///
    /// Default: `"RustCommander"`.
    pub commander_name: String,

    /// Implementation language reported in the handshake.
    ///
    /// Default: `"Rust"`.
    pub language: String,

    /// Connection retry behaviour.
    pub dial: DialConfig,

    /// Capacity of the command channel. A full channel makes
    /// `send` wait until the writer task catches up.
    ///
    /// Default: 1. Zero is raised to 1.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            commander_name: "RustCommander".to_string(),
            language: "Rust".to_string(),
            dial: DialConfig::default(),
            command_buffer: 1,
        }
    }
}

impl SessionConfig {
    /// Fixes out-of-range values.
    pub fn validated(mut self) -> Self {
        if self.command_buffer == 0 {
            tracing::warn!("command_buffer of 0 is not supported, using 1");
            self.command_buffer = 1;
        }
        self.dial = self.dial.validated();
        self
    }
}
