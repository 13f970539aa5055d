//! Session engine for the AI Sandbox client.
//!
//! This crate runs one connection to the sandbox server:
//!
//! 1. **Dial**: connect with a bounded retry window ([`SessionBuilder`]).
//! 2. **Handshake**: check the server's protocol version and answer with
//!    the commander name.
//! 3. **Dispatch**: turn `<initialize>` and `<tick>` payloads into
//!    [`Update`]s, linked by `aisandbox-model`.
//! 4. **Commands**: write whatever the consumer sends until it closes the
//!    command channel.
//!
//! # How it fits in the stack
//!
//! ```text
//! Your bot (above)     ← recv() updates, send() commands
//!     ↕
//! Session (this crate) ← state machine + writer task
//!     ↕
//! Model / Protocol / Transport (below)
//! ```

mod config;
mod error;
mod machine;
mod sender;
mod session;

pub use config::{DialConfig, SessionConfig};
pub use error::SessionError;
pub use machine::Update;
pub use session::{DEFAULT_ADDRESS, Session, SessionBuilder, SessionTasks};
