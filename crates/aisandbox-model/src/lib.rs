//! Linked game snapshots for the AI Sandbox client.
//!
//! The server describes the world as maps keyed by name: a flag names its
//! carrier, a bot names the enemies it can see. This crate turns each raw
//! snapshot into a [`GameInfo`] where those names are resolved to
//! [`BotId`]s into one per-snapshot arena of [`Bot`]s.
//!
//! ```text
//! RawGameInfo (names) → normalize() → GameInfo (linked)
//! ```
//!
//! [`LevelInfo`] has no references to resolve and is re-exported as is.

mod error;
mod normalize;
mod snapshot;
mod state;

pub use aisandbox_protocol::LevelInfo;
pub use error::{NormalizeError, Relation};
pub use normalize::{Normalized, normalize};
pub use snapshot::{Bot, BotId, CombatEvent, Flag, GameInfo, MatchInfo, Team};
pub use state::{BotState, CombatEventKind};
