//! Error types for snapshot normalization.

use std::fmt;

/// Which cross-reference a dangling name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// A flag's `carrier`.
    Carrier,
    /// A bot's `seenBy` list.
    SeenBy,
    /// A bot's `visibleEnemies` list.
    VisibleEnemies,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Carrier => "carrier",
            Self::SeenBy => "seenBy",
            Self::VisibleEnemies => "visibleEnemies",
        })
    }
}

/// Errors that can occur while linking a raw snapshot.
///
/// `MissingTeam` and `MissingFlag` make the snapshot unusable and are
/// returned as `Err`. Every other variant only affects one reference; it is
/// logged, collected in [`Normalized::warnings`](crate::Normalized), and the
/// snapshot is still produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    /// `team` or `enemyTeam` names a team that is not in `teams`.
    #[error("team {0:?} is not in the snapshot")]
    MissingTeam(String),

    /// A team names a flag that is not in `flags`.
    #[error("flag {flag:?} of team {team:?} is not in the snapshot")]
    MissingFlag {
        /// The team that owns the flag.
        team: String,
        /// The flag name the team refers to.
        flag: String,
    },

    /// A team lists a member that has no entry in `bots`.
    #[error("team {team:?} lists member {name:?} with no bot entry")]
    UnknownMember {
        /// The team whose member list mentions the name.
        team: String,
        /// The unresolved bot name.
        name: String,
    },

    /// A cross-reference names a bot that is not in the opposing roster.
    #[error("{owner:?} {relation} references unknown bot {name:?}")]
    UnknownBot {
        /// The bot (or, for carriers, the flag) holding the reference.
        owner: String,
        /// Which relation the reference came from.
        relation: Relation,
        /// The unresolved bot name.
        name: String,
    },

    /// A flag is carried by a bot of its own team.
    #[error("flag {flag:?} is carried by {carrier:?}, a member of its own team")]
    CarrierNotOnOpposingTeam {
        /// The flag name.
        flag: String,
        /// The carrier's name.
        carrier: String,
    },
}

impl NormalizeError {
    /// Returns `true` for errors that drop the whole snapshot.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingTeam(_) | Self::MissingFlag { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(NormalizeError::MissingTeam("Blue".into()).is_fatal());
        assert!(
            NormalizeError::MissingFlag {
                team: "Blue".into(),
                flag: "BlueFlag".into()
            }
            .is_fatal()
        );
        assert!(
            !NormalizeError::UnknownBot {
                owner: "Blue0".into(),
                relation: Relation::SeenBy,
                name: "Ghost".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_unknown_bot_message_names_relation() {
        let err = NormalizeError::UnknownBot {
            owner: "Blue0".into(),
            relation: Relation::VisibleEnemies,
            name: "Red9".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("visibleEnemies"));
        assert!(msg.contains("Red9"));
    }
}
