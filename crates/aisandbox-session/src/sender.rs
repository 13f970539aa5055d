//! The writer side of a session.
//!
//! One task owns the write half. It drains two channels:
//!
//! - the private control channel, fed by the reader (handshake reply);
//! - the public command channel, fed by the consumer.
//!
//! Control messages go first. When the command channel closes, the write
//! half is shut down, the reader is told to stop, and the task ends.

use aisandbox_protocol::{ClientMessage, Codec};
use aisandbox_transport::FrameWriter;
use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, oneshot};

use crate::SessionError;

pub(crate) struct CommandSender<W, C> {
    writer: FrameWriter<W>,
    codec: C,
    control: mpsc::UnboundedReceiver<ClientMessage>,
    commands: mpsc::Receiver<ClientMessage>,
    /// Signals the reader once this task is done with the connection.
    /// Dropped unsent if the task fails, which the reader treats the same.
    done: oneshot::Sender<()>,
}

impl<W, C> CommandSender<W, C>
where
    W: AsyncWrite + Unpin,
    C: Codec,
{
    pub(crate) fn new(
        writer: FrameWriter<W>,
        codec: C,
        control: mpsc::UnboundedReceiver<ClientMessage>,
        commands: mpsc::Receiver<ClientMessage>,
        done: oneshot::Sender<()>,
    ) -> Self {
        Self {
            writer,
            codec,
            control,
            commands,
            done,
        }
    }

    /// Writes messages until the command channel closes, then shuts down
    /// the write half and stops the reader.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] if a write fails. Messages that
    /// fail validation or encoding are logged and dropped instead.
    pub(crate) async fn run(mut self) -> Result<(), SessionError> {
        let mut control_open = true;
        let mut sent: u64 = 0;

        loop {
            let msg = tokio::select! {
                biased;
                msg = self.control.recv(), if control_open => match msg {
                    Some(msg) => msg,
                    None => {
                        control_open = false;
                        continue;
                    }
                },
                msg = self.commands.recv() => match msg {
                    Some(ClientMessage::Connect(_)) => {
                        tracing::warn!("handshake replies are sent by the session, dropping");
                        continue;
                    }
                    Some(msg) => msg,
                    None => break,
                },
            };

            if self.write(&msg).await? {
                sent += 1;
            }
        }

        tracing::debug!(sent, "command channel closed, closing connection");
        self.writer.close().await?;
        // The reader may already be gone.
        let _ = self.done.send(());
        Ok(())
    }

    /// Writes one message. Returns `false` if it was dropped.
    async fn write(&mut self, msg: &ClientMessage) -> Result<bool, SessionError> {
        if let ClientMessage::Command(command) = msg {
            if let Err(e) = command.validate() {
                tracing::warn!(error = %e, "dropping invalid command");
                return Ok(false);
            }
        }

        let payload = match msg.encode_payload(&self.codec) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(tag = msg.tag(), error = %e, "failed to encode message");
                return Ok(false);
            }
        };

        match &payload {
            Some(payload) => {
                self.writer
                    .write_frames(&[msg.tag().as_bytes(), payload.as_slice()])
                    .await?
            }
            None => self.writer.write_frame(msg.tag().as_bytes()).await?,
        }
        if let ClientMessage::Command(command) = msg {
            tracing::debug!(bot = command.bot(), class = command.class(), "command sent");
        } else {
            tracing::debug!(tag = msg.tag(), "message sent");
        }
        Ok(true)
    }
}
