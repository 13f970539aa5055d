//! Normalization of snapshots recorded from a live sandbox server.

use aisandbox_model::{BotState, CombatEventKind, GameInfo, normalize};
use aisandbox_protocol::{Codec, JsonCodec, LevelInfo, RawGameInfo};

const LEVEL: &str = include_str!("../../../testdata/level.json");
const INITIAL: &str = include_str!("../../../testdata/initialize_gameinfo.json");
const TICK: &str = include_str!("../../../testdata/tick_gameinfo.json");

fn decode(frame: &str) -> RawGameInfo {
    JsonCodec
        .decode_envelope(frame.trim().as_bytes(), RawGameInfo::CLASS)
        .unwrap()
}

fn linked(frame: &str) -> GameInfo {
    let out = normalize(decode(frame)).unwrap();
    assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    out.snapshot
}

#[test]
fn test_recorded_level_info() {
    let level: LevelInfo = JsonCodec
        .decode_envelope(LEVEL.trim().as_bytes(), LevelInfo::CLASS)
        .unwrap();
    assert_eq!(level.width, 88.0);
    assert_eq!(level.height, 50.0);
    assert_eq!(level.block_heights.len(), 88);
    assert!(level.block_heights.iter().all(|col| col.len() == 50));
    assert_eq!(level.team_names, ["Blue", "Red"]);
}

#[test]
fn test_initial_snapshot_has_full_rosters_and_no_carriers() {
    let game = linked(INITIAL);

    assert_eq!(game.team.name, "Blue");
    assert_eq!(game.enemy_team.name, "Red");
    assert_eq!(game.team.members.len(), 5);
    assert_eq!(game.enemy_team.members.len(), 5);
    assert_eq!(game.bots().len(), 10);
    assert!(game.team.flag.carrier.is_none());
    assert!(game.enemy_team.flag.carrier.is_none());

    // Enemy bots are out of sight: no position, state reported as unknown.
    for bot in game.enemy_bots() {
        assert!(bot.position.is_none());
        assert_eq!(bot.state, Some(BotState::Unknown));
    }
    for bot in game.own_bots() {
        assert!(bot.is_alive());
        assert!(bot.is_idle());
    }
    assert_eq!(game.match_info.time_remaining, 180.0);
    assert!(game.match_info.combat_events.is_empty());
}

#[test]
fn test_carried_flag_resolves_to_own_bot() {
    let game = linked(TICK);

    let carrier = game.carrier(&game.enemy_team.flag).unwrap();
    assert_eq!(carrier.name, "Blue1");
    assert_eq!(game.team.members.get("Blue1"), Some(&carrier.id));
    assert_eq!(carrier.flag.as_deref(), Some("RedFlag"));
    assert_eq!(carrier.current_action.as_deref(), Some("MoveCommand"));
    assert!(game.team.flag.carrier.is_none());
}

#[test]
fn test_visibility_is_symmetric_with_raw_input() {
    let raw = decode(TICK);
    let game = linked(TICK);

    let blue0 = game.bot_by_name("Blue0").unwrap();
    let mut seen: Vec<_> = game.visible_enemies(blue0).map(|b| b.name.clone()).collect();
    seen.sort();
    assert_eq!(seen, ["Red1", "Red2", "Red4"]);

    // Every linked edge in either list is present in the raw names, and
    // every visible enemy lists the viewer in its own seenBy.
    for bot in game.bots() {
        let raw_bot = &raw.bots[&bot.name].value;
        let seen_by: Vec<_> = game.seen_by(bot).map(|b| b.name.clone()).collect();
        assert_eq!(seen_by, raw_bot.seen_by);
        let visible: Vec<_> = game.visible_enemies(bot).map(|b| b.name.clone()).collect();
        assert_eq!(visible, raw_bot.visible_enemies);

        for enemy in game.visible_enemies(bot) {
            assert_ne!(enemy.team, bot.team);
            assert!(enemy.seen_by.contains(&bot.id));
        }
    }
}

#[test]
fn test_combat_events_keep_names_and_order() {
    let game = linked(TICK);
    let events = &game.match_info.combat_events;
    assert_eq!(events.len(), 10);
    assert_eq!(events[0].kind, CombatEventKind::Kill);
    assert_eq!(events[0].instigator.as_deref(), Some("Blue3"));
    assert_eq!(events[0].subject, "Red3");
    assert_eq!(events[7].kind, CombatEventKind::FlagPickedUp);
    assert_eq!(events[7].subject, "RedFlag");
    assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
}
