//! Transport layer for the AI Sandbox client.
//!
//! The sandbox server speaks a line-oriented protocol over one long-lived
//! TCP stream: every message is a single ASCII line terminated by `\n`.
//! This crate knows nothing about what the lines mean. It provides:
//!
//! - [`FrameReader`]: pulls one non-blank line at a time off a buffered
//!   reader.
//! - [`FrameWriter`]: writes lines, guaranteeing exactly one trailing
//!   newline and no embedded ones.
//! - [`dial`]: connects to the server, retrying transient failures for
//!   a bounded window described by [`DialConfig`].
//!
//! Reading and writing are independent directions. The session splits the
//! stream in two and hands each half to its own task, so neither side needs
//! a lock.

mod error;
mod frame;
mod tcp;

pub use error::TransportError;
pub use frame::{FrameReader, FrameWriter};
pub use tcp::{DialConfig, dial};
