//! Upstream spell sources.
//!
//! Two interchangeable implementations of [`SpellSource`]:
//! - [`Open5eSource`]: JSON API, one object per spell.
//! - [`StatblockSource`]: HTML spell pages with statblock markup.

mod open5e;
mod statblock;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::actions::spell::SpellQuery;
use crate::config::{MaestroConfig, SourceFormat};
use crate::error::{ActionError, ActionResult};
use crate::messages::Layout;
use crate::record::SpellSheet;

pub use open5e::{Open5eSource, SpellResponse};
pub use statblock::StatblockSource;

/// Something that can resolve a spell query into a [`SpellSheet`].
#[async_trait]
pub trait SpellSource: Send + Sync + std::fmt::Debug {
    /// Document shape this source understands.
    fn format(&self) -> SourceFormat;

    /// Grid layout used to display this source's records.
    fn layout(&self) -> &'static Layout;

    /// Fetch and extract a spell.
    async fn lookup(&self, query: &SpellQuery) -> ActionResult<SpellSheet>;
}

/// Build the source selected by the configuration.
pub fn build_source(config: &MaestroConfig, client: reqwest::Client) -> Arc<dyn SpellSource> {
    let base_url = config.spell_endpoint().to_string();
    match config.spell_format() {
        SourceFormat::Json => Arc::new(Open5eSource::new(client, base_url)),
        SourceFormat::Html => Arc::new(StatblockSource::new(client, base_url)),
    }
}

/// `<base>/<slug>`, tolerating a trailing slash on the base.
///
/// The slug is percent-encoded so stray `?` or `#` in user input stay in
/// the path segment.
pub(crate) fn spell_url(base_url: &str, slug: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(slug)
    )
}

/// GET the page for `query` and return its body.
///
/// A 404 means the user most likely misspelled the name; every other
/// non-success status is an upstream fault.
pub(crate) async fn fetch_body(
    client: &reqwest::Client,
    base_url: &str,
    query: &SpellQuery,
) -> ActionResult<String> {
    let url = spell_url(base_url, &query.slug());
    debug!("Fetching spell from {}", url);

    let resp = client.get(&url).send().await.map_err(|e| {
        warn!("failed to make a request to get spell data: {}", e);
        ActionError::from(e)
    })?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        debug!("Spell '{}' not found upstream", query.raw_name());
        return Err(ActionError::SpellNotFound {
            name: query.raw_name().to_string(),
        });
    }
    if !status.is_success() {
        return Err(ActionError::Upstream(format!(
            "GET {} returned {}",
            url, status
        )));
    }

    Ok(resp.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_url() {
        assert_eq!(
            spell_url("https://api.open5e.com/spells/", "fireball"),
            "https://api.open5e.com/spells/fireball"
        );
        assert_eq!(
            spell_url("http://localhost:8080/spells", "antipathy-sympathy"),
            "http://localhost:8080/spells/antipathy-sympathy"
        );
        assert_eq!(
            spell_url("http://localhost:8080/spells", "what?"),
            "http://localhost:8080/spells/what%3F"
        );
    }

    #[test]
    fn test_build_source_follows_format() {
        let client = reqwest::Client::new();

        let json = build_source(&MaestroConfig::default(), client.clone());
        assert_eq!(json.format(), SourceFormat::Json);

        let html = build_source(
            &MaestroConfig::new("https://www.dndbeyond.com/spells/", SourceFormat::Html),
            client,
        );
        assert_eq!(html.format(), SourceFormat::Html);
    }
}
