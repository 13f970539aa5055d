//! The reader side of a session: tag dispatch over incoming frames.
//!
//! ```text
//! AwaitHandshake ──<connect>──→ AwaitInitialize ──<initialize>──→ Ticking
//!       │                              │                           │ <tick>
//!       └────<shutdown> / version mismatch / EOF / writer done ────┴──→ Terminated
//! ```
//!
//! Payload decode failures skip the message and keep reading. A version
//! mismatch or a lost connection ends the session, and so does the writer
//! task shutting the connection down.

use std::fmt;

use aisandbox_model::{GameInfo, LevelInfo, normalize};
use aisandbox_protocol::{
    ClientConnect, ClientMessage, Codec, PROTOCOL_VERSION, RawGameInfo,
    ServerConnect, ServerTag,
};
use aisandbox_transport::FrameReader;
use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, oneshot};

use crate::SessionError;

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// One value delivered to the consumer.
///
/// Exactly one `Level` arrives, before the first `Game`.
#[derive(Debug, Clone)]
pub enum Update {
    /// Static level data, sent once on `<initialize>`.
    Level(LevelInfo),
    /// A linked world snapshot.
    Game(GameInfo),
}

// ---------------------------------------------------------------------------
// ProtocolState
// ---------------------------------------------------------------------------

/// Where the reader is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtocolState {
    /// Waiting for the server's `<connect>`.
    AwaitHandshake,
    /// Handshake done, waiting for `<initialize>`.
    AwaitInitialize,
    /// Receiving `<tick>`s.
    Ticking,
    /// Done. The update channel is closed.
    Terminated,
}

impl ProtocolState {
    /// Returns `true` once the reader has stopped.
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitHandshake => write!(f, "AwaitHandshake"),
            Self::AwaitInitialize => write!(f, "AwaitInitialize"),
            Self::Ticking => write!(f, "Ticking"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Drives the protocol from the read half of the connection.
pub(crate) struct Machine<R, C> {
    reader: FrameReader<R>,
    codec: C,
    state: ProtocolState,
    reply: ClientConnect,
    /// Messages for the writer task that the reader produces itself.
    control: mpsc::UnboundedSender<ClientMessage>,
    updates: mpsc::UnboundedSender<Update>,
    level_sent: bool,
}

impl<R, C> Machine<R, C>
where
    R: AsyncBufRead + Unpin,
    C: Codec,
{
    pub(crate) fn new(
        reader: FrameReader<R>,
        codec: C,
        reply: ClientConnect,
        control: mpsc::UnboundedSender<ClientMessage>,
        updates: mpsc::UnboundedSender<Update>,
    ) -> Self {
        Self {
            reader,
            codec,
            state: ProtocolState::AwaitHandshake,
            reply,
            control,
            updates,
            level_sent: false,
        }
    }

    /// Runs until `<shutdown>`, a fatal error, the consumer going away, or
    /// the writer task finishing.
    ///
    /// `writer_done` resolves once the writer has shut its half of the
    /// connection down; the reader stops then too, even if the server keeps
    /// its side open. Dropping `self` on return closes the update channel.
    pub(crate) async fn run(
        mut self,
        mut writer_done: oneshot::Receiver<()>,
    ) -> Result<(), SessionError> {
        while !self.state.is_terminal() {
            let step = tokio::select! {
                step = self.step() => step,
                _ = &mut writer_done => {
                    tracing::info!(state = %self.state, "command channel closed, stopping reader");
                    self.state = ProtocolState::Terminated;
                    break;
                }
            };
            if let Err(e) = step {
                self.state = ProtocolState::Terminated;
                match &e {
                    SessionError::Transport(t) if t.is_closed() => {
                        tracing::info!(reason = %t, "server closed the connection");
                    }
                    _ => tracing::error!(error = %e, "session terminated"),
                }
                return Err(e);
            }
        }
        tracing::debug!(frames = self.reader.frames_read(), "reader finished");
        Ok(())
    }

    async fn step(&mut self) -> Result<(), SessionError> {
        let frame = self.reader.next_frame().await?;
        let Some(tag) = ServerTag::parse(&frame) else {
            tracing::warn!(
                state = %self.state,
                frame = %preview(&frame),
                "expected a tag line, skipping"
            );
            return Ok(());
        };
        tracing::trace!(%tag, state = %self.state, "tag");

        // The whole payload is read before anything is decoded, so a bad
        // frame never leaves a payload line to be parsed as a tag.
        let payload = self.read_payload(tag).await?;

        use ProtocolState::*;
        match (self.state, tag, payload.as_slice()) {
            (_, ServerTag::Shutdown, _) => {
                tracing::info!(state = %self.state, "server shut down the match");
                self.state = Terminated;
            }
            (AwaitHandshake, ServerTag::Connect, [hello]) => self.handshake(hello)?,
            (AwaitHandshake, ServerTag::Initialize, [level, game]) => {
                tracing::warn!("<initialize> without a handshake");
                self.initialize(level, game);
            }
            (AwaitInitialize, ServerTag::Initialize, [level, game]) => {
                self.initialize(level, game)
            }
            (_, ServerTag::Initialize, [level, game]) => {
                tracing::warn!("duplicate <initialize>");
                self.initialize(level, game);
            }
            (Ticking, ServerTag::Tick, [game]) => self.game(game),
            (state, tag, _) => {
                tracing::warn!(%state, %tag, "unexpected tag, dropping its payload");
            }
        }
        Ok(())
    }

    /// Reads the payload lines that follow `tag`.
    async fn read_payload(
        &mut self,
        tag: ServerTag,
    ) -> Result<Vec<Vec<u8>>, SessionError> {
        let mut frames = Vec::with_capacity(tag.payload_frames());
        for _ in 0..tag.payload_frames() {
            frames.push(self.reader.next_frame().await?);
        }
        Ok(frames)
    }

    fn handshake(&mut self, frame: &[u8]) -> Result<(), SessionError> {
        let hello: ServerConnect =
            match self.codec.decode_envelope(frame, ServerConnect::CLASS) {
                Ok(hello) => hello,
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable handshake, skipping");
                    return Ok(());
                }
            };

        if hello.protocol_version != PROTOCOL_VERSION {
            tracing::error!(
                server = %hello.protocol_version,
                client = PROTOCOL_VERSION,
                "protocol version mismatch"
            );
            self.state = ProtocolState::Terminated;
            return Err(SessionError::VersionMismatch {
                server: hello.protocol_version,
                client: PROTOCOL_VERSION.to_string(),
            });
        }

        if self
            .control
            .send(ClientMessage::Connect(self.reply.clone()))
            .is_err()
        {
            tracing::debug!("writer gone, handshake reply not sent");
        }
        tracing::info!(
            version = PROTOCOL_VERSION,
            commander = %self.reply.commander_name,
            "handshake accepted"
        );
        self.state = ProtocolState::AwaitInitialize;
        Ok(())
    }

    fn initialize(&mut self, level_frame: &[u8], game_frame: &[u8]) {
        if !self.level_sent {
            let level: LevelInfo =
                match self.codec.decode_envelope(level_frame, LevelInfo::CLASS) {
                    Ok(level) => level,
                    Err(e) => {
                        tracing::warn!(error = %e, "undecodable level info, skipping <initialize>");
                        return;
                    }
                };
            tracing::info!(
                width = level.width,
                height = level.height,
                teams = ?level.team_names,
                "match initialized"
            );
            self.emit(Update::Level(level));
            self.level_sent = true;
        }

        if self.state != ProtocolState::Terminated {
            self.state = ProtocolState::Ticking;
            self.game(game_frame);
        }
    }

    /// Decodes, links, and emits one snapshot. Failures skip it.
    fn game(&mut self, frame: &[u8]) {
        let raw: RawGameInfo =
            match self.codec.decode_envelope(frame, RawGameInfo::CLASS) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable game info, skipping");
                    return;
                }
            };
        match normalize(raw) {
            Ok(normalized) => self.emit(Update::Game(normalized.snapshot)),
            Err(e) => tracing::warn!(error = %e, "unusable game info, skipping"),
        }
    }

    fn emit(&mut self, update: Update) {
        if self.updates.send(update).is_err() {
            tracing::info!("update receiver dropped, stopping reader");
            self.state = ProtocolState::Terminated;
        }
    }
}

/// First bytes of a frame, for log lines.
fn preview(frame: &[u8]) -> String {
    const MAX: usize = 64;
    let text = String::from_utf8_lossy(&frame[..frame.len().min(MAX)]);
    if frame.len() > MAX {
        format!("{text}...")
    } else {
        text.into_owned()
    }
}
