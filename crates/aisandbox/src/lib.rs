//! # AI Sandbox
//!
//! Client for the AI Sandbox capture-the-flag server.
//!
//! The sandbox pushes a world snapshot every tick over one TCP connection
//! and expects orders for your bots in return. This crate runs that
//! connection: you get a stream of [`Update`]s and send [`Command`]s back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aisandbox::prelude::*;
//!
//! # async fn run() -> Result<(), AiSandboxError> {
//! aisandbox::init_tracing();
//! let mut session = Session::connect("localhost:41041", "MyCommander").await?;
//!
//! while let Some(update) = session.recv().await {
//!     if let Update::Game(game) = update {
//!         for bot in game.own_bots().filter(|b| b.is_idle()) {
//!             let flag = game.enemy_team.flag.position.unwrap_or_default();
//!             session.send(Charge::new(&bot.name, "go get it", [flag])).await?;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::AiSandboxError;

pub use aisandbox_model::{
    Bot, BotId, BotState, CombatEvent, CombatEventKind, Flag, GameInfo,
    LevelInfo, MatchInfo, NormalizeError, Normalized, Relation, Team,
    normalize,
};
pub use aisandbox_protocol::{
    Area, Attack, Charge, ClientMessage, Codec, Command, Defend,
    FacingDirection, JsonCodec, Move, PROTOCOL_VERSION, ProtocolError,
    Vector2,
};
pub use aisandbox_session::{
    DEFAULT_ADDRESS, DialConfig, Session, SessionBuilder, SessionConfig,
    SessionError, SessionTasks, Update,
};
pub use aisandbox_transport::TransportError;

/// The lower layers, for code that needs more than the re-exports above.
pub mod raw {
    pub use aisandbox_protocol as protocol;
    pub use aisandbox_transport as transport;
}

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this
/// more than once, or after another subscriber was installed, does
/// nothing.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Everything a bot usually needs.
pub mod prelude {
    pub use crate::{
        AiSandboxError, Attack, BotState, Charge, ClientMessage, Defend,
        GameInfo, LevelInfo, Move, Session, SessionConfig, Update, Vector2,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn test_prelude_covers_a_round() {
        use crate::prelude::*;

        let msg: ClientMessage = Move::new("Blue0", "m", [Vector2::new(1.0, 1.0)]).into();
        assert_eq!(msg.tag(), "<command>");
        assert_eq!(PROTOCOL_VERSION, "1.2");
    }
}
