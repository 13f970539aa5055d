//! Protocol tags and outgoing messages.
//!
//! A bare tag line announces what follows. The server sends:
//!
//! ```text
//! <connect>      + 1 payload line  (ServerConnect)
//! <initialize>   + 2 payload lines (LevelInfo, GameInfo)
//! <tick>         + 1 payload line  (GameInfo)
//! <shutdown>     (no payload)
//! ```
//!
//! The client answers with `<connect>` + `ConnectClient`, `<ready>`, and
//! `<command>` + one command envelope.

use std::fmt;

use crate::{ClientConnect, Codec, Command, ProtocolError};

// ---------------------------------------------------------------------------
// ServerTag
// ---------------------------------------------------------------------------

/// A tag line sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerTag {
    /// Handshake; followed by the server's protocol version.
    Connect,
    /// Match setup; followed by level info and the first snapshot.
    Initialize,
    /// Regular update; followed by one snapshot.
    Tick,
    /// End of the match; nothing follows.
    Shutdown,
}

impl ServerTag {
    /// Parses a frame as a tag. Surrounding whitespace is ignored.
    ///
    /// Returns `None` for anything that is not one of the four server tags,
    /// including stray JSON lines.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        match frame.trim_ascii() {
            b"<connect>" => Some(Self::Connect),
            b"<initialize>" => Some(Self::Initialize),
            b"<tick>" => Some(Self::Tick),
            b"<shutdown>" => Some(Self::Shutdown),
            _ => None,
        }
    }

    /// The tag as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "<connect>",
            Self::Initialize => "<initialize>",
            Self::Tick => "<tick>",
            Self::Shutdown => "<shutdown>",
        }
    }

    /// How many payload lines follow this tag.
    pub fn payload_frames(self) -> usize {
        match self {
            Self::Connect | Self::Tick => 1,
            Self::Initialize => 2,
            Self::Shutdown => 0,
        }
    }
}

impl fmt::Display for ServerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Everything the client can put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Handshake reply. Sent by the session itself after a successful
    /// version check.
    Connect(ClientConnect),
    /// "Initialization data processed, start whenever you like."
    Ready,
    /// An order for one bot.
    Command(Command),
}

impl ClientMessage {
    /// The tag line announcing this message.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connect(_) => "<connect>",
            Self::Ready => "<ready>",
            Self::Command(_) => "<command>",
        }
    }

    /// Encodes the payload line, if this message has one.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the codec fails.
    pub fn encode_payload<C: Codec>(
        &self,
        codec: &C,
    ) -> Result<Option<Vec<u8>>, ProtocolError> {
        match self {
            Self::Connect(reply) => codec
                .encode_envelope(ClientConnect::CLASS, reply)
                .map(Some),
            Self::Ready => Ok(None),
            Self::Command(command) => codec.encode(command).map(Some),
        }
    }
}

impl From<Command> for ClientMessage {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

macro_rules! impl_into_client_message {
    ($($ty:ident),*) => {
        $(
            impl From<crate::$ty> for ClientMessage {
                fn from(c: crate::$ty) -> Self {
                    Self::Command(Command::from(c))
                }
            }
        )*
    };
}

impl_into_client_message!(Move, Attack, Charge, Defend);
