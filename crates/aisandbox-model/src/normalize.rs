//! Turns a name-keyed [`RawGameInfo`] into a linked [`GameInfo`].
//!
//! Linking happens in two passes. The first builds every bot listed in
//! either team's roster, so both rosters are complete before anything is
//! resolved. The second resolves flag carriers and each bot's `seenBy` and
//! `visibleEnemies` against the *opposing* roster.
//!
//! A name that does not resolve drops only that one entry. The problem is
//! logged and reported in [`Normalized::warnings`]; the rest of the
//! snapshot is kept.

use std::collections::HashMap;

use aisandbox_protocol::{
    Envelope, RawBotInfo, RawFlagInfo, RawGameInfo, RawMatchInfo, RawTeamInfo,
};

use crate::{
    Bot, BotId, BotState, CombatEvent, CombatEventKind, Flag, GameInfo,
    MatchInfo, NormalizeError, Relation, Team,
};

/// A linked snapshot plus the reference problems found while linking it.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub snapshot: GameInfo,
    /// Non-fatal problems, in the order they were found.
    pub warnings: Vec<NormalizeError>,
}

/// Links a raw snapshot.
///
/// # Errors
/// - [`NormalizeError::MissingTeam`] if `team` or `enemyTeam` is not a key
///   of `teams`.
/// - [`NormalizeError::MissingFlag`] if a team's flag is not a key of
///   `flags`.
///
/// Dangling bot names are not errors; see [`Normalized::warnings`].
pub fn normalize(raw: RawGameInfo) -> Result<Normalized, NormalizeError> {
    let RawGameInfo {
        mut teams,
        team,
        enemy_team,
        mut flags,
        mut bots,
        match_info,
    } = raw;

    let own = take_team(&mut teams, &team)?;
    let enemy = take_team(&mut teams, &enemy_team)?;
    let own_flag = take_flag(&mut flags, &own)?;
    let enemy_flag = take_flag(&mut flags, &enemy)?;

    let mut linker = Linker::default();

    // Pass 1: both rosters, unlinked.
    let own_roster = linker.add_roster(&own, Side::Own, &mut bots);
    let enemy_roster = linker.add_roster(&enemy, Side::Enemy, &mut bots);

    // Pass 2: everything that points at a bot.
    let own_carrier =
        linker.resolve_carrier(&own_flag, &enemy_roster, &own_roster);
    let enemy_carrier =
        linker.resolve_carrier(&enemy_flag, &own_roster, &enemy_roster);
    linker.link_visibility(&own_roster, &enemy_roster);

    let RawMatchInfo {
        time_remaining,
        time_to_next_respawn,
        time_passed,
        combat_events,
        scores,
    } = match_info.into_value();
    let score = |name: &str| scores.get(name).copied().unwrap_or(0.0);

    let team = build_team(
        own,
        own_flag,
        own_carrier,
        own_roster,
        score(&team),
    );
    let enemy_team = build_team(
        enemy,
        enemy_flag,
        enemy_carrier,
        enemy_roster,
        score(&enemy_team),
    );

    let match_info = MatchInfo {
        time_remaining,
        time_to_next_respawn,
        time_passed,
        combat_events: combat_events
            .into_iter()
            .map(|e| {
                let e = e.into_value();
                CombatEvent {
                    kind: CombatEventKind::from_code(e.kind),
                    instigator: e.instigator,
                    subject: e.subject,
                    time: e.time,
                }
            })
            .collect(),
    };

    tracing::debug!(
        bots = linker.bots.len(),
        warnings = linker.warnings.len(),
        "snapshot normalized"
    );

    Ok(Normalized {
        snapshot: GameInfo {
            team,
            enemy_team,
            match_info,
            bots: linker.bots,
        },
        warnings: linker.warnings,
    })
}

// ---------------------------------------------------------------------------
// Linker
// ---------------------------------------------------------------------------

type Roster = HashMap<String, BotId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Own,
    Enemy,
}

/// Name lists of one bot, waiting for the second pass.
#[derive(Debug)]
struct Pending {
    side: Side,
    seen_by: Vec<String>,
    visible_enemies: Vec<String>,
}

#[derive(Debug, Default)]
struct Linker {
    bots: Vec<Bot>,
    pending: Vec<Pending>,
    warnings: Vec<NormalizeError>,
}

impl Linker {
    fn warn(&mut self, err: NormalizeError) {
        tracing::warn!(error = %err, "unresolved reference in snapshot");
        self.warnings.push(err);
    }

    fn add_roster(
        &mut self,
        team: &RawTeamInfo,
        side: Side,
        bots: &mut HashMap<String, Envelope<RawBotInfo>>,
    ) -> Roster {
        let mut roster = Roster::with_capacity(team.members.len());
        for name in &team.members {
            if roster.contains_key(name) {
                tracing::debug!(team = %team.name, bot = %name, "duplicate member");
                continue;
            }
            let Some(raw) = bots.remove(name) else {
                self.warn(NormalizeError::UnknownMember {
                    team: team.name.clone(),
                    name: name.clone(),
                });
                continue;
            };
            let raw = raw.into_value();
            let id = BotId(self.bots.len());
            self.bots.push(Bot {
                id,
                name: name.clone(),
                team: raw.team,
                position: raw.position,
                facing_direction: raw.facing_direction,
                flag: raw.flag,
                state: raw.state.map(BotState::from_code),
                health: raw.health,
                seen_last: raw.seen_last,
                current_action: raw.current_action,
                seen_by: Vec::new(),
                visible_enemies: Vec::new(),
            });
            self.pending.push(Pending {
                side,
                seen_by: raw.seen_by,
                visible_enemies: raw.visible_enemies,
            });
            roster.insert(name.clone(), id);
        }
        roster
    }

    /// Resolves a flag's carrier in the roster of the team that can carry
    /// it.
    fn resolve_carrier(
        &mut self,
        flag: &RawFlagInfo,
        opposing: &Roster,
        own: &Roster,
    ) -> Option<BotId> {
        let name = flag.carrier.as_deref()?;
        if let Some(&id) = opposing.get(name) {
            return Some(id);
        }
        let err = if own.contains_key(name) {
            NormalizeError::CarrierNotOnOpposingTeam {
                flag: flag.name.clone(),
                carrier: name.to_string(),
            }
        } else {
            NormalizeError::UnknownBot {
                owner: flag.name.clone(),
                relation: Relation::Carrier,
                name: name.to_string(),
            }
        };
        self.warn(err);
        None
    }

    fn link_visibility(&mut self, own: &Roster, enemy: &Roster) {
        let pending = std::mem::take(&mut self.pending);
        for (index, p) in pending.into_iter().enumerate() {
            let opposing = match p.side {
                Side::Own => enemy,
                Side::Enemy => own,
            };
            let seen_by = self.resolve(index, Relation::SeenBy, p.seen_by, opposing);
            let visible = self.resolve(
                index,
                Relation::VisibleEnemies,
                p.visible_enemies,
                opposing,
            );
            let bot = &mut self.bots[index];
            bot.seen_by = seen_by;
            bot.visible_enemies = visible;
        }
    }

    fn resolve(
        &mut self,
        index: usize,
        relation: Relation,
        names: Vec<String>,
        opposing: &Roster,
    ) -> Vec<BotId> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            match opposing.get(&name) {
                Some(&id) => ids.push(id),
                None => {
                    let owner = self.bots[index].name.clone();
                    self.warn(NormalizeError::UnknownBot {
                        owner,
                        relation,
                        name,
                    });
                }
            }
        }
        ids
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn take_team(
    teams: &mut HashMap<String, Envelope<RawTeamInfo>>,
    name: &str,
) -> Result<RawTeamInfo, NormalizeError> {
    teams
        .remove(name)
        .map(Envelope::into_value)
        .ok_or_else(|| NormalizeError::MissingTeam(name.to_string()))
}

fn take_flag(
    flags: &mut HashMap<String, Envelope<RawFlagInfo>>,
    team: &RawTeamInfo,
) -> Result<RawFlagInfo, NormalizeError> {
    flags
        .remove(&team.flag)
        .map(Envelope::into_value)
        .ok_or_else(|| NormalizeError::MissingFlag {
            team: team.name.clone(),
            flag: team.flag.clone(),
        })
}

fn build_team(
    raw: RawTeamInfo,
    flag: RawFlagInfo,
    carrier: Option<BotId>,
    members: Roster,
    score: f64,
) -> Team {
    Team {
        name: raw.name,
        flag: Flag {
            name: flag.name,
            team: flag.team,
            position: flag.position,
            carrier,
            respawn_timer: flag.respawn_timer,
        },
        members,
        flag_spawn_location: raw.flag_spawn_location,
        flag_score_location: raw.flag_score_location,
        bot_spawn_area: raw.bot_spawn_area,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bot(name: &str, team: &str, seen_by: &[&str], visible: &[&str]) -> serde_json::Value {
        json!({
            "__class__": "BotInfo",
            "__value__": {
                "name": name, "team": team,
                "position": [1.0, 2.0], "facingDirection": [1.0, 0.0],
                "flag": null, "state": 1, "health": 100, "seenlast": 0,
                "seenBy": seen_by, "visibleEnemies": visible
            }
        })
    }

    fn team(name: &str, members: &[&str]) -> serde_json::Value {
        json!({
            "__class__": "TeamInfo",
            "__value__": {
                "name": name, "flag": format!("{name}Flag"), "members": members,
                "flagSpawnLocation": [0.0, 0.0], "flagScoreLocation": [0.0, 0.0],
                "botSpawnArea": [[0.0, 0.0], [1.0, 1.0]]
            }
        })
    }

    fn flag(name: &str, team: &str, carrier: Option<&str>) -> serde_json::Value {
        json!({
            "__class__": "FlagInfo",
            "__value__": {
                "name": name, "team": team, "position": [0.0, 0.0],
                "carrier": carrier, "respawnTimer": 0
            }
        })
    }

    fn raw(
        bots: Vec<(&str, serde_json::Value)>,
        red_carrier: Option<&str>,
        blue_carrier: Option<&str>,
    ) -> RawGameInfo {
        let bots: serde_json::Map<String, serde_json::Value> =
            bots.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        serde_json::from_value(json!({
            "teams": {
                "Blue": team("Blue", &["Blue0", "Blue1"]),
                "Red": team("Red", &["Red0", "Red1"])
            },
            "team": "Blue",
            "enemyTeam": "Red",
            "flags": {
                "BlueFlag": flag("BlueFlag", "Blue", blue_carrier),
                "RedFlag": flag("RedFlag", "Red", red_carrier)
            },
            "bots": bots,
            "match": {
                "__class__": "MatchInfo",
                "__value__": {
                    "timeRemaining": 100.0, "timeToNextRespawn": 5.0,
                    "timePassed": 80.0, "combatEvents": [],
                    "scores": {"Blue": 2, "Red": 1}
                }
            }
        }))
        .unwrap()
    }

    fn four_bots() -> Vec<(&'static str, serde_json::Value)> {
        vec![
            ("Blue0", bot("Blue0", "Blue", &[], &["Red0"])),
            ("Blue1", bot("Blue1", "Blue", &["Red1"], &[])),
            ("Red0", bot("Red0", "Red", &["Blue0"], &[])),
            ("Red1", bot("Red1", "Red", &[], &["Blue1"])),
        ]
    }

    #[test]
    fn test_links_visibility_across_teams() {
        let out = normalize(raw(four_bots(), None, None)).unwrap();
        assert!(out.warnings.is_empty());
        let game = out.snapshot;

        let blue0 = game.bot_by_name("Blue0").unwrap();
        let seen: Vec<_> = game.visible_enemies(blue0).map(|b| b.name.as_str()).collect();
        assert_eq!(seen, ["Red0"]);

        let red0 = game.bot_by_name("Red0").unwrap();
        let watchers: Vec<_> = game.seen_by(red0).map(|b| b.name.as_str()).collect();
        assert_eq!(watchers, ["Blue0"]);
    }

    #[test]
    fn test_scores_and_state() {
        let game = normalize(raw(four_bots(), None, None)).unwrap().snapshot;
        assert_eq!(game.team.score, 2.0);
        assert_eq!(game.enemy_team.score, 1.0);
        assert_eq!(game.match_info.time_passed, 80.0);
        assert!(game.bots().iter().all(|b| b.state == Some(BotState::Idle)));
    }

    #[test]
    fn test_carrier_resolves_in_opposing_roster() {
        let game = normalize(raw(four_bots(), Some("Blue1"), None))
            .unwrap()
            .snapshot;
        let carrier = game.carrier(&game.enemy_team.flag).unwrap();
        assert_eq!(carrier.name, "Blue1");
        assert_eq!(carrier.team, "Blue");
        assert!(game.team.flag.carrier.is_none());
    }

    #[test]
    fn test_carrier_on_own_team_is_reported() {
        let out = normalize(raw(four_bots(), Some("Red0"), None)).unwrap();
        assert!(out.snapshot.enemy_team.flag.carrier.is_none());
        assert_eq!(
            out.warnings,
            vec![NormalizeError::CarrierNotOnOpposingTeam {
                flag: "RedFlag".into(),
                carrier: "Red0".into(),
            }]
        );
    }

    #[test]
    fn test_unknown_carrier_is_reported() {
        let out = normalize(raw(four_bots(), None, Some("Ghost"))).unwrap();
        assert!(out.snapshot.team.flag.carrier.is_none());
        assert!(matches!(
            &out.warnings[..],
            [NormalizeError::UnknownBot { relation: Relation::Carrier, .. }]
        ));
    }

    #[test]
    fn test_dangling_name_drops_only_that_entry() {
        let mut bots = four_bots();
        bots[0].1 = bot("Blue0", "Blue", &[], &["Red0", "Red7", "Red1"]);
        let out = normalize(raw(bots, None, None)).unwrap();

        let game = &out.snapshot;
        let blue0 = game.bot_by_name("Blue0").unwrap();
        let seen: Vec<_> = game.visible_enemies(blue0).map(|b| b.name.as_str()).collect();
        assert_eq!(seen, ["Red0", "Red1"]);
        assert_eq!(
            out.warnings,
            vec![NormalizeError::UnknownBot {
                owner: "Blue0".into(),
                relation: Relation::VisibleEnemies,
                name: "Red7".into(),
            }]
        );
    }

    #[test]
    fn test_teammate_in_visibility_list_is_not_linked() {
        let mut bots = four_bots();
        bots[1].1 = bot("Blue1", "Blue", &["Blue0"], &[]);
        let out = normalize(raw(bots, None, None)).unwrap();
        let blue1 = out.snapshot.bot_by_name("Blue1").unwrap();
        assert!(blue1.seen_by.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_missing_member_entry_is_reported() {
        let mut bots = four_bots();
        bots.retain(|(name, _)| *name != "Red1");
        let out = normalize(raw(bots, None, None)).unwrap();
        assert_eq!(out.snapshot.enemy_team.members.len(), 1);
        // Blue1's seenBy pointed at Red1, which no longer exists.
        assert!(out.warnings.contains(&NormalizeError::UnknownMember {
            team: "Red".into(),
            name: "Red1".into(),
        }));
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_missing_team_is_fatal() {
        let mut r = raw(four_bots(), None, None);
        r.enemy_team = "Green".into();
        assert_eq!(
            normalize(r).unwrap_err(),
            NormalizeError::MissingTeam("Green".into())
        );
    }

    #[test]
    fn test_missing_flag_is_fatal() {
        let mut r = raw(four_bots(), None, None);
        r.flags.remove("RedFlag");
        assert!(matches!(
            normalize(r).unwrap_err(),
            NormalizeError::MissingFlag { .. }
        ));
    }
}
