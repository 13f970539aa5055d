//! The linked world snapshot handed to a commander.
//!
//! A [`GameInfo`] owns every [`Bot`] of the tick in one arena. Everything
//! that points at a bot (team rosters, a flag's carrier, the visibility
//! lists) holds a [`BotId`] into that arena, so the graph has no cycles of
//! ownership and no reference can outlive the snapshot it came from.

use std::collections::HashMap;
use std::fmt;

use aisandbox_protocol::{Area, Vector2};
use serde::Serialize;

use crate::{BotState, CombatEventKind};

// ---------------------------------------------------------------------------
// BotId
// ---------------------------------------------------------------------------

/// Index of a bot within one [`GameInfo`].
///
/// Only meaningful for the snapshot that produced it: the same bot may get
/// a different id next tick. Use the bot's name to follow it across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BotId(pub usize);

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Bot / Flag / Team
// ---------------------------------------------------------------------------

/// One bot as seen in this tick.
///
/// The optional fields are `None` while the bot is not visible to the
/// observing team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bot {
    pub id: BotId,
    pub name: String,
    pub team: String,
    pub position: Option<Vector2>,
    pub facing_direction: Option<Vector2>,
    /// Name of the flag this bot carries.
    pub flag: Option<String>,
    pub state: Option<BotState>,
    pub health: Option<f64>,
    pub seen_last: Option<f64>,
    /// Name of the command being executed, as reported by the server.
    pub current_action: Option<String>,
    /// Opposing bots that can see this bot.
    pub seen_by: Vec<BotId>,
    /// Opposing bots this bot can see.
    pub visible_enemies: Vec<BotId>,
}

impl Bot {
    /// Returns `true` if the bot is known to have health left.
    pub fn is_alive(&self) -> bool {
        self.health.is_some_and(|h| h > 0.0)
    }

    /// Returns `true` if the bot is known to be idle.
    pub fn is_idle(&self) -> bool {
        self.state.is_some_and(BotState::is_idle)
    }
}

/// A team's flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flag {
    pub name: String,
    pub team: String,
    pub position: Option<Vector2>,
    /// The opposing bot carrying this flag.
    pub carrier: Option<BotId>,
    pub respawn_timer: f64,
}

/// One side of the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub flag: Flag,
    /// Bot name → bot.
    pub members: HashMap<String, BotId>,
    pub flag_spawn_location: Vector2,
    pub flag_score_location: Vector2,
    pub bot_spawn_area: Option<Area>,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// MatchInfo
// ---------------------------------------------------------------------------

/// Timing and history of the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchInfo {
    pub time_remaining: f64,
    pub time_to_next_respawn: f64,
    pub time_passed: f64,
    /// Every event since the start of the match, oldest first.
    pub combat_events: Vec<CombatEvent>,
}

/// One match event.
///
/// Names are kept as strings: the bots involved may be long dead by the
/// time a commander looks at the event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatEvent {
    pub kind: CombatEventKind,
    pub instigator: Option<String>,
    pub subject: String,
    pub time: f64,
}

// ---------------------------------------------------------------------------
// GameInfo
// ---------------------------------------------------------------------------

/// A fully linked world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameInfo {
    /// The team this commander controls.
    pub team: Team,
    /// The opposing team.
    pub enemy_team: Team,
    pub match_info: MatchInfo,
    pub(crate) bots: Vec<Bot>,
}

impl GameInfo {
    /// Looks up a bot by id.
    pub fn bot(&self, id: BotId) -> Option<&Bot> {
        self.bots.get(id.0)
    }

    /// Looks up a bot of either team by name.
    pub fn bot_by_name(&self, name: &str) -> Option<&Bot> {
        self.team
            .members
            .get(name)
            .or_else(|| self.enemy_team.members.get(name))
            .and_then(|&id| self.bot(id))
    }

    /// Every bot of the tick, own team first.
    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    /// The bots on `team`, in no particular order.
    pub fn members<'a>(&'a self, team: &'a Team) -> impl Iterator<Item = &'a Bot> + 'a {
        team.members.values().filter_map(|&id| self.bot(id))
    }

    /// The bots this commander controls.
    pub fn own_bots(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter().filter(|b| b.team == self.team.name)
    }

    /// The opposing bots.
    pub fn enemy_bots(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter().filter(|b| b.team == self.enemy_team.name)
    }

    /// The bot carrying `flag`, if any.
    pub fn carrier(&self, flag: &Flag) -> Option<&Bot> {
        flag.carrier.and_then(|id| self.bot(id))
    }

    /// The opposing bots that can see `bot`.
    pub fn seen_by<'a>(&'a self, bot: &'a Bot) -> impl Iterator<Item = &'a Bot> + 'a {
        bot.seen_by.iter().filter_map(|&id| self.bot(id))
    }

    /// The opposing bots `bot` can see.
    pub fn visible_enemies<'a>(
        &'a self,
        bot: &'a Bot,
    ) -> impl Iterator<Item = &'a Bot> + 'a {
        bot.visible_enemies.iter().filter_map(|&id| self.bot(id))
    }
}
