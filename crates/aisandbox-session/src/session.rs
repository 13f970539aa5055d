//! `Session` builder and task wiring.
//!
//! A session owns one connection and two tasks:
//!
//! ```text
//!            ┌──────────── reader task (Machine) ─────────→ updates
//! server ←→  │                   │ control (handshake reply)
//!            └──────────── writer task (CommandSender) ←─── commands
//! ```
//!
//! The halves of the connection are used independently, so neither task
//! takes a lock. When the writer finishes it signals the reader over a
//! oneshot, so closing the command channel ends both tasks.

use aisandbox_protocol::{ClientConnect, ClientMessage, JsonCodec};
use aisandbox_transport::{DialConfig, FrameReader, FrameWriter, dial};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::machine::Machine;
use crate::sender::CommandSender;
use crate::{SessionConfig, SessionError, Update};

/// Where [`SessionBuilder`] dials when no address is given.
pub const DEFAULT_ADDRESS: &str = "localhost:41041";

// ---------------------------------------------------------------------------
// SessionBuilder
// ---------------------------------------------------------------------------

/// Builder for connecting a [`Session`].
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), aisandbox_session::SessionError> {
/// use aisandbox_session::Session;
///
/// let mut session = Session::builder()
///     .address("localhost:41041")
///     .commander_name("Bacon")
///     .connect()
///     .await?;
/// while let Some(update) = session.recv().await {
///     // react to the update
/// #   let _ = update;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    address: String,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            config: SessionConfig::default(),
        }
    }

    /// Sets the server address (`"host:port"`).
    pub fn address(mut self, addr: impl Into<String>) -> Self {
        self.address = addr.into();
        self
    }

    /// Sets the name reported in the handshake.
    pub fn commander_name(mut self, name: impl Into<String>) -> Self {
        self.config.commander_name = name.into();
        self
    }

    /// Sets the language reported in the handshake.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    /// Sets the dial retry behaviour.
    pub fn dial(mut self, dial: DialConfig) -> Self {
        self.config.dial = dial;
        self
    }

    /// Sets the command channel capacity.
    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.config.command_buffer = capacity;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Dials the server and starts the session.
    ///
    /// Returns as soon as the TCP connection is up; the handshake happens
    /// in the background.
    ///
    /// # Errors
    /// Returns [`SessionError::Connect`] if the server cannot be reached
    /// within the dial window.
    pub async fn connect(self) -> Result<Session, SessionError> {
        let config = self.config.validated();
        let stream = dial(&self.address, &config.dial)
            .await
            .map_err(SessionError::Connect)?;
        let (read, write) = stream.into_split();
        Ok(Session::start(read, write, config))
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A live connection to the sandbox server.
///
/// Updates arrive in server order through [`recv`](Self::recv); the first
/// is always [`Update::Level`]. `recv` returning `None` means the session
/// is over. Dropping the session (or the command sender obtained from
/// [`into_parts`](Self::into_parts)) closes the connection.
#[derive(Debug)]
pub struct Session {
    updates: mpsc::UnboundedReceiver<Update>,
    commands: mpsc::Sender<ClientMessage>,
    tasks: SessionTasks,
}

impl Session {
    /// Connects to `addr` with default settings and the given commander
    /// name.
    ///
    /// # Errors
    /// Same as [`SessionBuilder::connect`].
    pub async fn connect(
        addr: &str,
        commander_name: impl Into<String>,
    ) -> Result<Self, SessionError> {
        SessionBuilder::new()
            .address(addr)
            .commander_name(commander_name)
            .connect()
            .await
    }

    /// Creates a builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Runs a session over an already-open stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_stream<S>(stream: S, config: SessionConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, write) = tokio::io::split(stream);
        Self::start(read, write, config.validated())
    }

    fn start<R, W>(read: R, write: W, config: SessionConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (updates_tx, updates) = mpsc::unbounded_channel();
        let (commands, commands_rx) = mpsc::channel(config.command_buffer);
        let (writer_done, writer_done_rx) = oneshot::channel();

        let reply = ClientConnect {
            commander_name: config.commander_name,
            language: config.language,
        };
        let machine = Machine::new(
            FrameReader::new(BufReader::new(read)),
            JsonCodec,
            reply,
            control_tx,
            updates_tx,
        );
        let sender = CommandSender::new(
            FrameWriter::new(write),
            JsonCodec,
            control_rx,
            commands_rx,
            writer_done,
        );

        let tasks = SessionTasks {
            reader: tokio::spawn(machine.run(writer_done_rx)),
            writer: tokio::spawn(sender.run()),
        };
        Self {
            updates,
            commands,
            tasks,
        }
    }

    /// Waits for the next update. `None` once the session has ended.
    pub async fn recv(&mut self) -> Option<Update> {
        self.updates.recv().await
    }

    /// Queues a message for the server, waiting if the channel is full.
    ///
    /// # Errors
    /// - [`SessionError::Protocol`] if `msg` is a command the server would
    ///   reject (no bot name, no targets).
    /// - [`SessionError::Closed`] if the writer task has stopped.
    pub async fn send(
        &self,
        msg: impl Into<ClientMessage>,
    ) -> Result<(), SessionError> {
        let msg = msg.into();
        if let ClientMessage::Command(command) = &msg {
            command.validate()?;
        }
        self.commands
            .send(msg)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// A handle for sending from other tasks. The connection stays open
    /// while any handle is alive.
    pub fn sender(&self) -> mpsc::Sender<ClientMessage> {
        self.commands.clone()
    }

    /// Splits the session into its update receiver, command sender and
    /// task handles.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedReceiver<Update>,
        mpsc::Sender<ClientMessage>,
        SessionTasks,
    ) {
        (self.updates, self.commands, self.tasks)
    }

    /// Closes the command channel and waits for the writer to shut the
    /// connection down. The reader stops as well.
    ///
    /// Handles from [`sender`](Self::sender) keep the connection open until
    /// they are dropped too.
    ///
    /// # Errors
    /// Returns the writer task's error, if it had one.
    pub async fn close(self) -> Result<(), SessionError> {
        drop(self.commands);
        drop(self.updates);
        self.tasks.writer.await?
    }
}

// ---------------------------------------------------------------------------
// SessionTasks
// ---------------------------------------------------------------------------

/// Handles of the two tasks behind a session.
#[derive(Debug)]
pub struct SessionTasks {
    reader: JoinHandle<Result<(), SessionError>>,
    writer: JoinHandle<Result<(), SessionError>>,
}

impl SessionTasks {
    /// Waits for both tasks and reports why the session ended.
    ///
    /// The reader's outcome wins: a version mismatch or a lost connection
    /// is more telling than whatever the writer saw afterwards. The writer
    /// only finishes once every command sender is dropped.
    ///
    /// # Errors
    /// The first task error, reader first.
    pub async fn join(self) -> Result<(), SessionError> {
        let reader = self.reader.await?;
        let writer = self.writer.await?;
        reader.and(writer)
    }

    /// Waits for the reader task only.
    ///
    /// # Errors
    /// The reader's error, e.g. [`SessionError::VersionMismatch`].
    pub async fn reader(self) -> Result<(), SessionError> {
        self.reader.await?
    }
}
