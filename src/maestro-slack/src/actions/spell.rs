//! `/spell <name>`

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::DndAction;
use crate::commands::ActionKind;
use crate::error::ActionResult;
use crate::messages::{SlashCommandResponse, format_spell_response};
use crate::record::SpellSheet;
use crate::sources::SpellSource;

/// Spell name as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellQuery {
    raw_name: String,
}

impl SpellQuery {
    /// Build a query from the raw argument text (`+` separated words).
    pub fn parse(argument_text: &str) -> Self {
        Self {
            raw_name: argument_text.replace('+', " "),
        }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// URL path form of the name: `Abi Dalzim's Horrid Wilting` becomes
    /// `abi-dalzims-horrid-wilting`.
    pub fn slug(&self) -> String {
        self.raw_name
            .to_lowercase()
            .chars()
            .filter(|c| *c != '\'')
            .map(|c| if c == ' ' || c == '/' { '-' } else { c })
            .collect()
    }
}

/// Look a spell up in `source`.
pub async fn resolve(query: &SpellQuery, source: &dyn SpellSource) -> ActionResult<SpellSheet> {
    debug!(
        "Resolving spell '{}' from {:?} source",
        query.raw_name(),
        source.format()
    );
    source.lookup(query).await
}

/// Spell lookup bound to a source.
#[derive(Debug, Clone)]
pub struct IdentifySpell {
    query: SpellQuery,
    source: Arc<dyn SpellSource>,
}

impl IdentifySpell {
    pub fn new(query: SpellQuery, source: Arc<dyn SpellSource>) -> Self {
        Self { query, source }
    }

    pub fn query(&self) -> &SpellQuery {
        &self.query
    }
}

#[async_trait]
impl DndAction for IdentifySpell {
    fn kind(&self) -> ActionKind {
        ActionKind::IdentifySpell
    }

    async fn process(&self) -> ActionResult<SlashCommandResponse> {
        let sheet = resolve(&self.query, self.source.as_ref()).await?;
        info!(
            "successfully identified spell '{}' ({} attributes)",
            self.query.raw_name(),
            sheet.record.len()
        );

        Ok(format_spell_response(sheet, self.source.layout()))
    }
}
