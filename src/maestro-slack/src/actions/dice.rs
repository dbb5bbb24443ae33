//! `/roll <num-dice> d<sides>`
//!
//! Slack sends the argument text with `+` for spaces, so `/roll 10 d20`
//! arrives as `10+d20`.

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

use super::DndAction;
use crate::commands::ActionKind;
use crate::error::{ActionError, ActionResult};
use crate::messages::SlashCommandResponse;

/// Upper bound on dice per roll.
pub const MAX_DICE: u32 = 1000;

/// Number of dice and sides per die, both positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceSpec {
    pub count: u32,
    pub sides: u32,
}

impl DiceSpec {
    /// Parse `<count>+d<sides>`.
    pub fn parse(input: &str) -> ActionResult<Self> {
        let parts: Vec<&str> = input.split('+').collect();
        let [count_token, sides_token] = parts.as_slice() else {
            return Err(ActionError::InvalidArguments(
                "incorrect number of dice roll parameters, expected <num-dice> d<sides>. ex: /roll 12 d20"
                    .to_string(),
            ));
        };

        let count: i64 = count_token.parse().map_err(|_| {
            ActionError::InvalidArguments(format!(
                "the first parameter, {}, needs to be the number of dice to roll (ex: 10)",
                count_token
            ))
        })?;

        let sides_error = || {
            ActionError::InvalidArguments(format!(
                "the second parameter, {}, needs to be the number of sides on the dice (ex: d20)",
                sides_token
            ))
        };
        let sides: i64 = sides_token
            .strip_prefix('d')
            .ok_or_else(sides_error)?
            .parse()
            .map_err(|_| sides_error())?;

        if count <= 0 {
            return Err(ActionError::InvalidArguments(format!(
                "the number of dice must be positive, got {}",
                count
            )));
        }
        if count > i64::from(MAX_DICE) {
            return Err(ActionError::InvalidArguments(format!(
                "cannot roll more than {} dice at once",
                MAX_DICE
            )));
        }
        let sides = u32::try_from(sides)
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| {
                ActionError::InvalidArguments(format!(
                    "the number of sides must be a positive number, got {}",
                    sides
                ))
            })?;

        Ok(Self {
            count: count as u32,
            sides,
        })
    }

    /// Sum of `count` uniform draws in `1..=sides`.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> u64 {
        (0..self.count)
            .map(|_| u64::from(rng.random_range(1..=self.sides)))
            .sum()
    }
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} d{}", self.count, self.sides)
    }
}

/// A validated dice roll for one user.
#[derive(Debug, Clone)]
pub struct DiceRoll {
    user: String,
    spec: DiceSpec,
}

impl DiceRoll {
    pub fn new(user: impl Into<String>, input: &str) -> ActionResult<Self> {
        Ok(Self {
            user: user.into(),
            spec: DiceSpec::parse(input)?,
        })
    }

    pub fn spec(&self) -> DiceSpec {
        self.spec
    }

    /// Roll with the given entropy source and describe the result.
    pub fn roll_with<R: Rng>(&self, rng: &mut R) -> (u64, String) {
        let total = self.spec.roll(rng);
        let text = format!("{} rolled {} and got {}", self.user, self.spec, total);
        (total, text)
    }
}

#[async_trait]
impl DndAction for DiceRoll {
    fn kind(&self) -> ActionKind {
        ActionKind::DiceRoll
    }

    async fn process(&self) -> ActionResult<SlashCommandResponse> {
        debug!("Processing dice roll on {:?}", self);
        let (total, text) = self.roll_with(&mut rand::rng());
        info!("successfully rolled {} and got {}", self.spec, total);

        Ok(SlashCommandResponse::text(text).in_channel())
    }
}
