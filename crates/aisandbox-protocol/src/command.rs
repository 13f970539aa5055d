//! Orders a commander sends to its bots.
//!
//! Each order is a plain struct with a constructor and a few builder
//! methods. [`Command`] is the closed set of all of them; its serde
//! representation is the sandbox envelope itself:
//!
//! ```text
//! {"__class__": "Move", "__value__": {"bot": "Blue0", "target": [[1.0, 2.0]], "description": "..."}}
//! ```

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Vector2};

// ---------------------------------------------------------------------------
// Move / Charge / Attack
// ---------------------------------------------------------------------------

/// Run to one or more waypoints, ignoring enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Name of the bot receiving the order.
    pub bot: String,
    /// Waypoints, visited in order.
    pub target: Vec<Vector2>,
    /// Free text shown by the sandbox visualizer.
    pub description: String,
}

impl Move {
    /// Creates a move order.
    pub fn new(
        bot: impl Into<String>,
        description: impl Into<String>,
        target: impl IntoIterator<Item = Vector2>,
    ) -> Self {
        Self {
            bot: bot.into(),
            target: target.into_iter().collect(),
            description: description.into(),
        }
    }

    /// Appends a waypoint.
    pub fn then(mut self, waypoint: Vector2) -> Self {
        self.target.push(waypoint);
        self
    }
}

/// Run to one or more waypoints, shooting at anything in range on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Name of the bot receiving the order.
    pub bot: String,
    /// Waypoints, visited in order.
    pub target: Vec<Vector2>,
    /// Free text shown by the sandbox visualizer.
    pub description: String,
}

impl Charge {
    /// Creates a charge order.
    pub fn new(
        bot: impl Into<String>,
        description: impl Into<String>,
        target: impl IntoIterator<Item = Vector2>,
    ) -> Self {
        Self {
            bot: bot.into(),
            target: target.into_iter().collect(),
            description: description.into(),
        }
    }

    /// Appends a waypoint.
    pub fn then(mut self, waypoint: Vector2) -> Self {
        self.target.push(waypoint);
        self
    }
}

/// Walk to one or more waypoints, optionally looking at a fixed point
/// instead of the direction of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    /// Name of the bot receiving the order.
    pub bot: String,
    /// Waypoints, visited in order.
    pub target: Vec<Vector2>,
    /// Point to face while walking. Omitted from the JSON when `None`.
    #[serde(
        rename = "lookAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub look_at: Option<Vector2>,
    /// Free text shown by the sandbox visualizer.
    pub description: String,
}

impl Attack {
    /// Creates an attack order that faces the direction of travel.
    pub fn new(
        bot: impl Into<String>,
        description: impl Into<String>,
        target: impl IntoIterator<Item = Vector2>,
    ) -> Self {
        Self {
            bot: bot.into(),
            target: target.into_iter().collect(),
            look_at: None,
            description: description.into(),
        }
    }

    /// Faces `point` while walking.
    pub fn look_at(mut self, point: Vector2) -> Self {
        self.look_at = Some(point);
        self
    }

    /// Appends a waypoint.
    pub fn then(mut self, waypoint: Vector2) -> Self {
        self.target.push(waypoint);
        self
    }
}

// ---------------------------------------------------------------------------
// Defend
// ---------------------------------------------------------------------------

/// One entry of a defend rotation: face `direction` for `duration` seconds.
///
/// Sent as `[[x, y], duration]`. A duration of zero asks the server for its
/// minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Vector2, f64)", into = "(Vector2, f64)")]
pub struct FacingDirection {
    /// Direction to face.
    pub direction: Vector2,
    /// Seconds to hold this direction before moving to the next entry.
    pub duration: f64,
}

impl From<(Vector2, f64)> for FacingDirection {
    fn from((direction, duration): (Vector2, f64)) -> Self {
        Self { direction, duration }
    }
}

impl From<FacingDirection> for (Vector2, f64) {
    fn from(f: FacingDirection) -> Self {
        (f.direction, f.duration)
    }
}

/// Stand still, cycling through one or more facing directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defend {
    /// Name of the bot receiving the order.
    pub bot: String,
    /// Directions to cycle through, in order.
    #[serde(rename = "facingDirections")]
    pub facing_directions: Vec<FacingDirection>,
    /// Free text shown by the sandbox visualizer.
    pub description: String,
}

impl Defend {
    /// Creates a defend order with no directions yet; add them with
    /// [`facing`](Self::facing).
    pub fn new(bot: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            bot: bot.into(),
            facing_directions: Vec::new(),
            description: description.into(),
        }
    }

    /// Appends a direction held for `duration` seconds.
    pub fn facing(mut self, direction: Vector2, duration: f64) -> Self {
        self.facing_directions.push(FacingDirection {
            direction,
            duration,
        });
        self
    }

    /// Builds a defend order from loose coordinate slices.
    ///
    /// `[x, y]` faces that direction for the server's minimum duration;
    /// `[x, y, duration]` also sets the duration. Entries of any other
    /// length are skipped.
    pub fn from_directions<I, D>(
        bot: impl Into<String>,
        description: impl Into<String>,
        directions: I,
    ) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[f64]>,
    {
        let mut defend = Self::new(bot, description);
        for entry in directions {
            match *entry.as_ref() {
                [x, y] => defend = defend.facing(Vector2::new(x, y), 0.0),
                [x, y, duration] => {
                    defend = defend.facing(Vector2::new(x, y), duration);
                }
                ref other => {
                    tracing::debug!(
                        bot = %defend.bot,
                        len = other.len(),
                        "skipping defend direction with wrong arity"
                    );
                }
            }
        }
        defend
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Any order a commander can send.
///
/// Adjacent tagging puts the variant name in `__class__` and the struct in
/// `__value__`, which is exactly the sandbox envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__class__", content = "__value__")]
pub enum Command {
    /// See [`Move`].
    Move(Move),
    /// See [`Attack`].
    Attack(Attack),
    /// See [`Charge`].
    Charge(Charge),
    /// See [`Defend`].
    Defend(Defend),
}

impl Command {
    /// Name of the bot this command is for.
    pub fn bot(&self) -> &str {
        match self {
            Self::Move(c) => &c.bot,
            Self::Attack(c) => &c.bot,
            Self::Charge(c) => &c.bot,
            Self::Defend(c) => &c.bot,
        }
    }

    /// The wire class name.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Move(_) => "Move",
            Self::Attack(_) => "Attack",
            Self::Charge(_) => "Charge",
            Self::Defend(_) => "Defend",
        }
    }

    /// Checks the command is something the server will accept.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if the bot name is empty,
    /// a movement order has no waypoints, or a defend order has no
    /// directions.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.bot().is_empty() {
            return Err(ProtocolError::InvalidMessage(format!(
                "{} command without a bot name",
                self.class()
            )));
        }
        let empty = match self {
            Self::Move(c) => c.target.is_empty(),
            Self::Attack(c) => c.target.is_empty(),
            Self::Charge(c) => c.target.is_empty(),
            Self::Defend(c) => c.facing_directions.is_empty(),
        };
        if empty {
            return Err(ProtocolError::InvalidMessage(format!(
                "{} command for {} has no targets",
                self.class(),
                self.bot()
            )));
        }
        Ok(())
    }
}

macro_rules! impl_into_command {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Command {
                fn from(c: $variant) -> Self {
                    Self::$variant(c)
                }
            }
        )*
    };
}

impl_into_command!(Move, Attack, Charge, Defend);

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector2 {
        Vector2::new(x, y)
    }

    #[test]
    fn test_move_json_shape() {
        let cmd: Command = Move::new("Blue0", "go", [v(1.0, 2.0)]).into();
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["__class__"], "Move");
        assert_eq!(json["__value__"]["bot"], "Blue0");
        assert_eq!(json["__value__"]["target"], serde_json::json!([[1.0, 2.0]]));
        assert_eq!(json["__value__"]["description"], "go");
    }

    #[test]
    fn test_attack_omits_look_at_when_absent() {
        let cmd: Command = Attack::new("Blue0", "shoot", [v(23.0, 93.0)]).into();
        let json = serde_json::to_value(&cmd).unwrap();
        assert!(json["__value__"].get("lookAt").is_none());
    }

    #[test]
    fn test_attack_includes_look_at() {
        let cmd: Command = Attack::new("Blue0", "shoot", [v(23.0, 93.0)])
            .look_at(v(3.0, 5.0))
            .into();
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["__class__"], "Attack");
        assert_eq!(json["__value__"]["lookAt"], serde_json::json!([3.0, 5.0]));
    }

    #[test]
    fn test_defend_json_shape() {
        let cmd: Command = Defend::new("Blue0", "hold")
            .facing(v(1.0, 0.0), 2.5)
            .into();
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["__class__"], "Defend");
        assert_eq!(
            json["__value__"]["facingDirections"],
            serde_json::json!([[[1.0, 0.0], 2.5]])
        );
    }

    #[test]
    fn test_defend_from_directions_skips_wrong_arity() {
        let d = Defend::from_directions(
            "bacon1",
            "Is delicious",
            [
                vec![1.2, 2.3, 3.4],
                vec![7.2, -2.6],
                vec![1.0],
                vec![1.0, 2.0, 3.0, 4.0],
            ],
        );
        assert_eq!(
            d.facing_directions,
            vec![
                FacingDirection { direction: v(1.2, 2.3), duration: 3.4 },
                FacingDirection { direction: v(7.2, -2.6), duration: 0.0 },
            ]
        );
    }

    #[test]
    fn test_waypoints_chain() {
        let m = Move::new("b", "", [v(0.0, 0.0)]).then(v(1.0, 1.0));
        assert_eq!(m.target.len(), 2);
        let c = Charge::new("b", "", Vec::new()).then(v(1.0, 1.0));
        assert_eq!(c.target, vec![v(1.0, 1.0)]);
    }

    #[test]
    fn test_command_round_trip() {
        let commands: Vec<Command> = vec![
            Move::new("Blue0", "m", [v(1.0, 2.0), v(3.0, 4.0)]).into(),
            Attack::new("Blue1", "a", [v(5.0, 6.0)]).look_at(v(7.0, 8.0)).into(),
            Charge::new("Blue2", "c", [v(9.0, 10.0)]).into(),
            Defend::new("Blue3", "d").facing(v(0.0, 1.0), 1.5).into(),
        ];
        for cmd in commands {
            let bytes = serde_json::to_vec(&cmd).unwrap();
            let back: Command = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(back, cmd);
        }
    }

    #[test]
    fn test_validate() {
        assert!(Command::from(Move::new("b", "", [v(0.0, 0.0)])).validate().is_ok());
        assert!(Command::from(Move::new("", "", [v(0.0, 0.0)])).validate().is_err());
        assert!(Command::from(Attack::new("b", "", Vec::new())).validate().is_err());
        assert!(Command::from(Defend::new("b", "")).validate().is_err());
        assert!(
            Command::from(Defend::new("b", "").facing(v(1.0, 0.0), 0.0))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_bot_and_class_accessors() {
        let cmd: Command = Charge::new("Red4", "", [v(0.0, 0.0)]).into();
        assert_eq!(cmd.bot(), "Red4");
        assert_eq!(cmd.class(), "Charge");
    }
}
