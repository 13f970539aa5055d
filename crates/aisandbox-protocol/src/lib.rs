//! Wire protocol for the AI Sandbox.
//!
//! This crate defines the "language" the client and the sandbox server
//! speak:
//!
//! - **Types** ([`Envelope`], [`Vector2`], [`Area`]): the shared building
//!   blocks of every payload.
//! - **Wire payloads** ([`ServerConnect`], [`LevelInfo`], [`RawGameInfo`],
//!   ...): what the server sends, exactly as it arrives.
//! - **Commands** ([`Command`], [`Move`], [`Attack`], [`Charge`],
//!   [`Defend`]): what the client sends.
//! - **Tags** ([`ServerTag`], [`ClientMessage`]): the bare lines that
//!   announce each message.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how payloads become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (lines) → Protocol (tags + envelopes) → Model (linked snapshot)
//! ```
//!
//! Nothing here touches a socket.

mod codec;
mod command;
mod error;
mod message;
mod types;
mod wire;

/// The protocol version this client speaks. The server announces its own
/// in the `<connect>` handshake; the two must match exactly.
pub const PROTOCOL_VERSION: &str = "1.2";

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::{Attack, Charge, Command, Defend, FacingDirection, Move};
pub use error::ProtocolError;
pub use message::{ClientMessage, ServerTag};
pub use types::{Area, Envelope, Vector2};
pub use wire::{
    ClientConnect, LevelInfo, RawBotInfo, RawCombatEvent, RawFlagInfo,
    RawGameInfo, RawMatchInfo, RawTeamInfo, ServerConnect,
};
