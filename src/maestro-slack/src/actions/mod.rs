//! Dungeons & Dragons actions triggered by slash commands.

pub mod dice;
pub mod spell;

use std::sync::Arc;

use async_trait::async_trait;

use crate::commands::ActionKind;
use crate::error::ActionResult;
use crate::messages::SlashCommandResponse;
use crate::payload::CommandEnvelope;
use crate::sources::SpellSource;

pub use dice::{DiceRoll, DiceSpec};
pub use spell::{IdentifySpell, SpellQuery};

/// An action ready to run; arguments are already validated.
#[async_trait]
pub trait DndAction: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ActionKind;

    /// Run the action and build the channel response.
    async fn process(&self) -> ActionResult<SlashCommandResponse>;
}

/// Construct the action for `kind` from the command envelope.
///
/// Argument parsing happens here, so malformed input fails before any
/// side effect.
pub fn build_action(
    kind: ActionKind,
    envelope: &CommandEnvelope,
    source: &Arc<dyn SpellSource>,
) -> ActionResult<Box<dyn DndAction>> {
    match kind {
        ActionKind::DiceRoll => Ok(Box::new(DiceRoll::new(
            envelope.invoking_user.clone(),
            &envelope.argument_text,
        )?)),
        ActionKind::IdentifySpell => Ok(Box::new(IdentifySpell::new(
            SpellQuery::parse(&envelope.argument_text),
            Arc::clone(source),
        ))),
    }
}
