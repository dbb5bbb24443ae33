//! HTML spell source (statblock spell pages).

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{SpellSource, fetch_body};
use crate::actions::spell::SpellQuery;
use crate::config::SourceFormat;
use crate::error::{ActionError, ActionResult};
use crate::extract::StatblockDocument;
use crate::messages::Layout;
use crate::record::{SpellField, SpellSheet};

/// Attributes extracted from a spell page, in display order.
const STATBLOCK_FIELDS: &[SpellField] = &[
    SpellField::Level,
    SpellField::CastingTime,
    SpellField::RangeArea,
    SpellField::Components,
    SpellField::Duration,
    SpellField::School,
    SpellField::AttackSave,
    SpellField::DamageEffect,
];

const STATBLOCK_LAYOUT: Layout = Layout::Packed(STATBLOCK_FIELDS);

/// Spell source backed by HTML spell pages.
#[derive(Debug, Clone)]
pub struct StatblockSource {
    client: reqwest::Client,
    base_url: String,
}

impl StatblockSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

/// Turn a fetched page into a sheet; all attributes or nothing.
fn sheet_from_page(body: &str, query: &SpellQuery) -> ActionResult<SpellSheet> {
    let document = StatblockDocument::parse(body);

    if document.is_not_found() {
        debug!("Upstream served its not-found page for '{}'", query.raw_name());
        return Err(ActionError::SpellNotFound {
            name: query.raw_name().to_string(),
        });
    }

    let record = document.extract_all(STATBLOCK_FIELDS).map_err(|missing| {
        let missing: Vec<String> = missing.iter().map(|f| f.title().to_string()).collect();
        warn!(?missing, "Spell page is missing attributes");
        ActionError::MissingFields(missing)
    })?;

    Ok(SpellSheet {
        headline: format!("Description of the spell {}", query.raw_name()),
        record,
    })
}

#[async_trait]
impl SpellSource for StatblockSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Html
    }

    fn layout(&self) -> &'static Layout {
        &STATBLOCK_LAYOUT
    }

    async fn lookup(&self, query: &SpellQuery) -> ActionResult<SpellSheet> {
        let body = fetch_body(&self.client, &self.base_url, query).await?;
        sheet_from_page(&body, query)
    }
}
