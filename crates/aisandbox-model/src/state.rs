//! Bot states and combat event kinds.
//!
//! The server sends both as bare numbers. Anything outside the known range
//! maps to the `Unknown`/`None` variant instead of failing the snapshot.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// BotState
// ---------------------------------------------------------------------------

/// What a bot is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BotState {
    Unknown,
    Idle,
    Defending,
    Moving,
    Attacking,
    Charging,
    Shooting,
}

impl BotState {
    /// Maps a wire code (`0..=6`) to a state.
    pub fn from_code(code: f64) -> Self {
        match code as i64 {
            _ if code.fract() != 0.0 => Self::Unknown,
            1 => Self::Idle,
            2 => Self::Defending,
            3 => Self::Moving,
            4 => Self::Attacking,
            5 => Self::Charging,
            6 => Self::Shooting,
            _ => Self::Unknown,
        }
    }

    /// Returns `true` if the bot has no order to carry out.
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Idle => write!(f, "idle"),
            Self::Defending => write!(f, "defending"),
            Self::Moving => write!(f, "moving"),
            Self::Attacking => write!(f, "attacking"),
            Self::Charging => write!(f, "charging"),
            Self::Shooting => write!(f, "shooting"),
        }
    }
}

// ---------------------------------------------------------------------------
// CombatEventKind
// ---------------------------------------------------------------------------

/// What a combat event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CombatEventKind {
    None,
    Kill,
    FlagPickedUp,
    FlagDropped,
    FlagCaptured,
    FlagRestored,
    Respawn,
}

impl CombatEventKind {
    /// Maps a wire code (`0..=6`) to an event kind.
    pub fn from_code(code: f64) -> Self {
        match code as i64 {
            _ if code.fract() != 0.0 => Self::None,
            1 => Self::Kill,
            2 => Self::FlagPickedUp,
            3 => Self::FlagDropped,
            4 => Self::FlagCaptured,
            5 => Self::FlagRestored,
            6 => Self::Respawn,
            _ => Self::None,
        }
    }
}

impl fmt::Display for CombatEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Kill => write!(f, "kill"),
            Self::FlagPickedUp => write!(f, "flag picked up"),
            Self::FlagDropped => write!(f, "flag dropped"),
            Self::FlagCaptured => write!(f, "flag captured"),
            Self::FlagRestored => write!(f, "flag restored"),
            Self::Respawn => write!(f, "respawn"),
        }
    }
}
