//! Slash command routing.
//!
//! Supports the following slash commands:
//! - `/roll <num-dice> d<sides>` - Roll dice
//! - `/spell <spell name>` - Describe a spell

use tracing::{debug, warn};

use crate::error::{ActionError, ActionResult};

/// The statically known actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// `/roll`
    DiceRoll,
    /// `/spell`
    IdentifySpell,
}

impl ActionKind {
    /// All known actions.
    pub const ALL: [ActionKind; 2] = [ActionKind::DiceRoll, ActionKind::IdentifySpell];

    /// The command word that selects this action.
    pub fn command(&self) -> &'static str {
        match self {
            Self::DiceRoll => "roll",
            Self::IdentifySpell => "spell",
        }
    }
}

/// Map a bare command word to an action.
///
/// Matching is exact and case-sensitive.
pub fn route(command: &str) -> ActionResult<ActionKind> {
    match ActionKind::ALL.into_iter().find(|kind| kind.command() == command) {
        Some(kind) => {
            debug!(?kind, "Routed command");
            Ok(kind)
        }
        None => {
            warn!("Unable to determine request type: {}", command);
            Err(ActionError::UnknownCommand {
                command: command.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_route_known_commands() {
        assert_eq!(route("roll").unwrap(), ActionKind::DiceRoll);
        assert_eq!(route("spell").unwrap(), ActionKind::IdentifySpell);
    }

    #[test]
    fn test_route_unknown_command() {
        let err = route("frobnicate").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::User);
        assert!(err.to_string().contains("[/roll, /spell]"));
    }

    #[test]
    fn test_route_is_exact() {
        assert!(route("Roll").is_err());
        assert!(route("rol").is_err());
        assert!(route("rolls").is_err());
        assert!(route("/roll").is_err());
        assert!(route("").is_err());
    }
}
