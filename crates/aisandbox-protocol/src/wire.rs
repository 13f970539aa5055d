//! Raw server payloads, exactly as they arrive.
//!
//! These types mirror the JSON the sandbox sends. Cross-references are plain
//! name strings: a flag names its carrier, a bot names the bots it can see.
//! `aisandbox-model` turns a [`RawGameInfo`] into a linked graph.
//!
//! Scalars the server blanks out for bots the observing team cannot see
//! arrive as `null` and decode to `None`, which keeps "not visible" apart
//! from a real zero health or a zero timer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::null_as_default;
use crate::{Area, Envelope, Vector2};

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Server → client handshake, the payload following `<connect>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConnect {
    /// The protocol version the server speaks.
    pub protocol_version: String,
}

impl ServerConnect {
    /// Envelope class name.
    pub const CLASS: &'static str = "ConnectServer";
}

/// Client → server handshake reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConnect {
    /// Display name of this commander.
    pub commander_name: String,
    /// Implementation language reported to the server.
    pub language: String,
}

impl ClientConnect {
    /// Envelope class name.
    pub const CLASS: &'static str = "ConnectClient";
}

// ---------------------------------------------------------------------------
// LevelInfo
// ---------------------------------------------------------------------------

/// Static level geometry and game constants.
///
/// Sent once, right after `<initialize>`. The session hands it to the
/// consumer unchanged: it has no cross-references to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    /// Level width in blocks.
    pub width: f64,
    /// Level height in blocks.
    pub height: f64,
    /// `block_heights[x][y]` is the height of the block at `(x, y)`.
    pub block_heights: Vec<Vec<f64>>,
    /// Names of the participating teams.
    pub team_names: Vec<String>,
    /// Team name → where that team's flag spawns.
    pub flag_spawn_locations: HashMap<String, Vector2>,
    /// Team name → where that team scores a captured flag.
    pub flag_score_locations: HashMap<String, Vector2>,
    /// Team name → the area its bots respawn in.
    pub bot_spawn_areas: HashMap<String, Area>,
    /// Field of view of a bot, in radians.
    #[serde(rename = "FOVangle")]
    pub fov_angle: f64,
    /// Collision radius of a bot.
    pub character_radius: f64,
    /// Movement speed while walking (attacking).
    pub walking_speed: f64,
    /// Movement speed while running (moving, charging).
    pub running_speed: f64,
    /// Maximum shooting range.
    pub firing_distance: f64,
    /// Length of the match in seconds.
    #[serde(default)]
    pub game_length: f64,
    /// Seconds the commander may spend on initialization.
    #[serde(default)]
    pub initialization_time: f64,
    /// Seconds between respawn waves.
    #[serde(default)]
    pub respawn_time: f64,
}

impl LevelInfo {
    /// Envelope class name.
    pub const CLASS: &'static str = "LevelInfo";

    /// Height of the block at `(x, y)`, or `None` outside the grid.
    pub fn block_height(&self, x: usize, y: usize) -> Option<f64> {
        self.block_heights.get(x)?.get(y).copied()
    }

    /// Returns `true` if `p` lies within the level bounds.
    pub fn contains(&self, p: Vector2) -> bool {
        (0.0..self.width).contains(&p.x) && (0.0..self.height).contains(&p.y)
    }
}

// ---------------------------------------------------------------------------
// GameInfo and its parts
// ---------------------------------------------------------------------------

/// One world snapshot, keyed by names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGameInfo {
    /// Team name → team.
    pub teams: HashMap<String, Envelope<RawTeamInfo>>,
    /// Name of the team this commander controls.
    pub team: String,
    /// Name of the opposing team.
    pub enemy_team: String,
    /// Flag name → flag.
    pub flags: HashMap<String, Envelope<RawFlagInfo>>,
    /// Bot name → bot, for both teams.
    pub bots: HashMap<String, Envelope<RawBotInfo>>,
    /// Match timing, scores, and events.
    #[serde(rename = "match")]
    pub match_info: Envelope<RawMatchInfo>,
}

impl RawGameInfo {
    /// Envelope class name.
    pub const CLASS: &'static str = "GameInfo";
}

/// A team as the server describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeamInfo {
    /// Team name.
    pub name: String,
    /// Name of this team's flag.
    pub flag: String,
    /// Names of this team's bots.
    #[serde(default, deserialize_with = "null_as_default")]
    pub members: Vec<String>,
    /// Where this team's flag spawns.
    pub flag_spawn_location: Vector2,
    /// Where this team scores.
    pub flag_score_location: Vector2,
    /// The area this team's bots respawn in. Older servers send it as
    /// `flagSpawnArea`.
    #[serde(default, alias = "flagSpawnArea")]
    pub bot_spawn_area: Option<Area>,
}

/// A flag as the server describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlagInfo {
    /// Flag name.
    pub name: String,
    /// Owning team.
    pub team: String,
    /// Current position, `None` if unknown.
    #[serde(default)]
    pub position: Option<Vector2>,
    /// Name of the bot carrying the flag, `None` if it is not carried.
    #[serde(default)]
    pub carrier: Option<String>,
    /// Seconds until a dropped flag returns home.
    #[serde(default, deserialize_with = "null_as_default")]
    pub respawn_timer: f64,
}

/// A bot as the server describes it.
///
/// Everything after `team` is `None` when the bot is not currently visible
/// to the observing side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBotInfo {
    /// Bot name.
    pub name: String,
    /// Team name.
    pub team: String,
    /// Position on the level.
    #[serde(default)]
    pub position: Option<Vector2>,
    /// Facing direction.
    #[serde(default)]
    pub facing_direction: Option<Vector2>,
    /// Name of the flag this bot carries.
    #[serde(default)]
    pub flag: Option<String>,
    /// Numeric state code (see `BotState` in the model crate).
    #[serde(default)]
    pub state: Option<f64>,
    /// Health points; zero means dead.
    #[serde(default)]
    pub health: Option<f64>,
    /// Seconds since this bot was last seen.
    #[serde(default, rename = "seenlast")]
    pub seen_last: Option<f64>,
    /// Name of the command the bot is executing.
    #[serde(default)]
    pub current_action: Option<String>,
    /// Names of enemy bots this bot can see.
    #[serde(default, deserialize_with = "null_as_default")]
    pub visible_enemies: Vec<String>,
    /// Names of enemy bots that can see this bot.
    #[serde(default, deserialize_with = "null_as_default")]
    pub seen_by: Vec<String>,
}

/// Match-level state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMatchInfo {
    /// Seconds left in the match.
    pub time_remaining: f64,
    /// Seconds until the next respawn wave.
    pub time_to_next_respawn: f64,
    /// Seconds since the match started.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_passed: f64,
    /// Events since the start of the match, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub combat_events: Vec<Envelope<RawCombatEvent>>,
    /// Team name → score.
    #[serde(default, deserialize_with = "null_as_default")]
    pub scores: HashMap<String, f64>,
}

/// One timestamped match event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCombatEvent {
    /// Numeric event code (see `CombatEventKind` in the model crate).
    #[serde(rename = "type")]
    pub kind: f64,
    /// Bot that caused the event; `None` for automatic events such as a
    /// flag reset or a respawn wave.
    #[serde(default)]
    pub instigator: Option<String>,
    /// Name of the bot or flag the event happened to.
    pub subject: String,
    /// Match time of the event.
    pub time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"{
        "width": 88,
        "height": 50,
        "blockHeights": [[1, 2, 3], [4, 5], [6, 7, 8, 9]],
        "teamNames": ["Blue", "Red"],
        "flagSpawnLocations": {"Blue": [82.0, 20.0], "Red": [6.0, 30.0]},
        "flagScoreLocations": {"Blue": [82.0, 20.0], "Red": [6.0, 30.0]},
        "botSpawnAreas": {
            "Blue": [[79.0, 2.0], [85.0, 9.0]],
            "Red": [[3.0, 41.0], [9.0, 48.0]]
        },
        "FOVangle": 1.5707963267948966,
        "characterRadius": 0.25,
        "walkingSpeed": 3.0,
        "runningSpeed": 6.0,
        "firingDistance": 15.0
    }"#;

    #[test]
    fn test_level_info_decodes_fields() {
        let level: LevelInfo = serde_json::from_str(LEVEL).unwrap();
        assert_eq!(level.width, 88.0);
        assert_eq!(level.height, 50.0);
        assert_eq!(level.block_height(0, 1), Some(2.0));
        assert_eq!(level.block_height(1, 2), None);
        assert_eq!(level.fov_angle, std::f64::consts::FRAC_PI_2);
        assert_eq!(level.character_radius, 0.25);
        assert_eq!(level.bot_spawn_areas["Blue"].min.y, 2.0);
        assert_eq!(level.flag_spawn_locations["Red"], Vector2::new(6.0, 30.0));
        // Absent timing fields default to zero.
        assert_eq!(level.game_length, 0.0);
        assert!(level.contains(Vector2::new(10.0, 10.0)));
        assert!(!level.contains(Vector2::new(88.0, 10.0)));
    }

    #[test]
    fn test_bot_info_null_fields_are_absent() {
        let json = r#"{
            "name": "Red3", "team": "Red",
            "position": null, "facingDirection": null,
            "flag": null, "state": null, "health": null, "seenlast": null,
            "currentAction": null,
            "visibleEnemies": null, "seenBy": []
        }"#;
        let bot: RawBotInfo = serde_json::from_str(json).unwrap();
        assert_eq!(bot.position, None);
        assert_eq!(bot.health, None);
        assert_eq!(bot.seen_last, None);
        assert!(bot.visible_enemies.is_empty());
    }

    #[test]
    fn test_bot_info_zero_health_is_not_absent() {
        let json = r#"{
            "name": "Red3", "team": "Red", "health": 0, "state": 6,
            "seenlast": 13.37, "currentAction": "ShootAtCommand",
            "position": [35.6, 26.8], "facingDirection": [0.9, -0.3],
            "seenBy": ["Blue0"], "visibleEnemies": []
        }"#;
        let bot: RawBotInfo = serde_json::from_str(json).unwrap();
        assert_eq!(bot.health, Some(0.0));
        assert_eq!(bot.state, Some(6.0));
        assert_eq!(bot.seen_last, Some(13.37));
        assert_eq!(bot.current_action.as_deref(), Some("ShootAtCommand"));
        assert_eq!(bot.seen_by, vec!["Blue0".to_string()]);
    }

    #[test]
    fn test_flag_info_null_carrier() {
        let json = r#"{
            "position": [82, 20], "carrier": null, "name": "BlueFlag",
            "respawnTimer": -7.450580596923828e-9, "team": "Blue"
        }"#;
        let flag: RawFlagInfo = serde_json::from_str(json).unwrap();
        assert_eq!(flag.carrier, None);
        assert_eq!(flag.position, Some(Vector2::new(82.0, 20.0)));
    }

    #[test]
    fn test_team_info_accepts_legacy_spawn_area_key() {
        let json = r#"{
            "name": "Blue", "flag": "BlueFlag", "members": ["Blue0"],
            "flagSpawnLocation": [82.0, 20.0], "flagScoreLocation": [82.0, 20.0],
            "flagSpawnArea": [[79.0, 2.0], [85.0, 9.0]]
        }"#;
        let team: RawTeamInfo = serde_json::from_str(json).unwrap();
        assert_eq!(team.bot_spawn_area.unwrap().max, Vector2::new(85.0, 9.0));
    }

    #[test]
    fn test_match_info_with_events() {
        let json = r#"{
            "timeRemaining": 148.4, "timeToNextRespawn": 13.4,
            "combatEvents": [
                {"__class__": "MatchCombatEvent",
                 "__value__": {"instigator": "Blue3", "time": 14.9, "type": 1, "subject": "Red3"}},
                {"__class__": "MatchCombatEvent",
                 "__value__": {"instigator": null, "time": 20.0, "type": 6, "subject": "Red3"}}
            ],
            "timePassed": 31.5, "scores": {"Blue": 1, "Red": 0}
        }"#;
        let m: RawMatchInfo = serde_json::from_str(json).unwrap();
        assert_eq!(m.combat_events.len(), 2);
        assert_eq!(m.combat_events[0].value.instigator.as_deref(), Some("Blue3"));
        assert_eq!(m.combat_events[1].value.instigator, None);
        assert_eq!(m.combat_events[1].value.kind, 6.0);
        assert_eq!(m.scores["Blue"], 1.0);
    }

    #[test]
    fn test_client_connect_field_names() {
        let reply = ClientConnect {
            commander_name: "Bacon".into(),
            language: "Rust".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["commanderName"], "Bacon");
        assert_eq!(json["language"], "Rust");
    }
}
