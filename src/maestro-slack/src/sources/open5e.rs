//! JSON spell source (open5e API shape).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SpellSource, fetch_body};
use crate::actions::spell::SpellQuery;
use crate::config::SourceFormat;
use crate::error::{ActionError, ActionResult};
use crate::messages::Layout;
use crate::record::{FieldRecord, SpellField, SpellSheet};

/// Rows shown for a JSON spell.
const OPEN5E_LAYOUT: Layout = Layout::Rows(&[
    &[
        SpellField::Level,
        SpellField::CastingTime,
        SpellField::Range,
        SpellField::Duration,
    ],
    &[SpellField::Description],
    &[SpellField::HigherLevels],
    &[SpellField::Components, SpellField::School],
    &[SpellField::Classes, SpellField::Material],
]);

/// Spell object returned by the API.
///
/// Displayed attributes are required so list pages and error objects fail
/// to parse instead of rendering an empty card.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellResponse {
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(default)]
    pub higher_level: String,
    #[serde(default)]
    pub page: String,
    pub range: String,
    pub components: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub ritual: String,
    pub duration: String,
    #[serde(default)]
    pub concentration: String,
    pub casting_time: String,
    pub level: String,
    pub school: String,
    pub dnd_class: String,
    #[serde(default)]
    pub archetype: String,
    #[serde(default)]
    pub circles: String,
}

impl SpellResponse {
    pub fn is_ritual(&self) -> bool {
        self.ritual.eq_ignore_ascii_case("yes")
    }

    /// Casting time with a `[R]` marker for rituals.
    pub fn casting_time_label(&self) -> String {
        if self.is_ritual() {
            format!("{} [R]", self.casting_time)
        } else {
            self.casting_time.clone()
        }
    }

    pub fn to_record(&self) -> FieldRecord {
        FieldRecord::new()
            .with(SpellField::Level, self.level.as_str())
            .with(SpellField::CastingTime, self.casting_time_label())
            .with(SpellField::Range, self.range.as_str())
            .with(SpellField::Duration, self.duration.as_str())
            .with(SpellField::Description, self.description.as_str())
            .with(SpellField::HigherLevels, self.higher_level.as_str())
            .with(SpellField::Components, self.components.as_str())
            .with(SpellField::School, self.school.as_str())
            .with(SpellField::Classes, self.dnd_class.as_str())
            .with(SpellField::Material, self.material.as_str())
    }
}

/// Spell source backed by a JSON API.
#[derive(Debug, Clone)]
pub struct Open5eSource {
    client: reqwest::Client,
    base_url: String,
}

impl Open5eSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SpellSource for Open5eSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn layout(&self) -> &'static Layout {
        &OPEN5E_LAYOUT
    }

    async fn lookup(&self, query: &SpellQuery) -> ActionResult<SpellSheet> {
        let body = fetch_body(&self.client, &self.base_url, query).await?;

        let spell: SpellResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("failed to parse the spell response: {}", e);
            ActionError::InvalidPayload(format!("failed to parse the spell response. {}", e))
        })?;
        if spell.name.trim().is_empty() {
            warn!("spell response for '{}' has no name", query.raw_name());
            return Err(ActionError::InvalidPayload(
                "spell response has an empty name".to_string(),
            ));
        }
        debug!(name = %spell.name, ritual = spell.is_ritual(), "Parsed spell response");

        Ok(SpellSheet {
            headline: format!("Description for {}", spell.name),
            record: spell.to_record(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fireball_json() -> serde_json::Value {
        serde_json::json!({
            "slug": "fireball",
            "name": "Fireball",
            "desc": "A bright streak flashes from your pointing finger...",
            "higher_level": "When you cast this spell using a spell slot of 4th level or higher...",
            "page": "phb 241",
            "range": "150 feet",
            "components": "V, S, M",
            "material": "A tiny ball of bat guano and sulfur.",
            "ritual": "no",
            "duration": "Instantaneous",
            "concentration": "no",
            "casting_time": "1 action",
            "level": "3rd-level",
            "level_int": 3,
            "school": "Evocation",
            "dnd_class": "Sorcerer, Wizard",
            "archetype": "",
            "circles": ""
        })
    }

    #[test]
    fn test_ritual_marker() {
        let spell = SpellResponse {
            casting_time: "1 minute".to_string(),
            ritual: "yes".to_string(),
            ..Default::default()
        };
        assert_eq!(spell.casting_time_label(), "1 minute [R]");

        let spell = SpellResponse {
            casting_time: "1 action".to_string(),
            ritual: "no".to_string(),
            ..Default::default()
        };
        assert_eq!(spell.casting_time_label(), "1 action");
    }

    #[test]
    fn test_layout_rows_within_bounds() {
        let Layout::Rows(rows) = OPEN5E_LAYOUT else {
            panic!("Expected explicit rows");
        };
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| row.len() <= crate::messages::MAX_CELLS_PER_ROW));
    }

    #[tokio::test]
    async fn test_lookup_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spells/fireball"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fireball_json()))
            .mount(&server)
            .await;

        let source = Open5eSource::new(reqwest::Client::new(), format!("{}/spells/", server.uri()));
        let sheet = source.lookup(&SpellQuery::parse("Fireball")).await.unwrap();

        assert_eq!(sheet.headline, "Description for Fireball");
        assert_eq!(sheet.record.get(SpellField::Level), Some("3rd-level"));
        assert_eq!(sheet.record.get(SpellField::CastingTime), Some("1 action"));
        assert_eq!(sheet.record.get(SpellField::Classes), Some("Sorcerer, Wizard"));
        assert_eq!(sheet.record.len(), 10);
    }

    #[tokio::test]
    async fn test_lookup_not_found_is_user_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Not found."
            })))
            .mount(&server)
            .await;

        let source = Open5eSource::new(reqwest::Client::new(), server.uri());
        let err = source
            .lookup(&SpellQuery::parse("Fire+Bal"))
            .await
            .unwrap_err();

        assert!(err.is_user_facing());
        assert!(err.to_string().contains("'Fire Bal'"));
    }

    #[tokio::test]
    async fn test_lookup_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = Open5eSource::new(reqwest::Client::new(), server.uri());
        let err = source.lookup(&SpellQuery::parse("Fireball")).await.unwrap_err();

        assert!(matches!(err, ActionError::Upstream(_)));
        assert!(!err.is_user_facing());
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let source = Open5eSource::new(reqwest::Client::new(), server.uri());
        let err = source.lookup(&SpellQuery::parse("Fireball")).await.unwrap_err();

        assert!(matches!(err, ActionError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_lookup_rejects_non_spell_objects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spells/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 0,
                "next": null,
                "results": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/spells/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "detail": "Not found."
            })))
            .mount(&server)
            .await;

        let source = Open5eSource::new(reqwest::Client::new(), format!("{}/spells/", server.uri()));
        for text in ["", "detail"] {
            let err = source.lookup(&SpellQuery::parse(text)).await.unwrap_err();
            assert!(matches!(err, ActionError::InvalidPayload(_)), "{text}: {err:?}");
            assert!(!err.is_user_facing());
        }
    }

    #[tokio::test]
    async fn test_lookup_rejects_empty_name() {
        let server = MockServer::start().await;
        let mut body = fireball_json();
        body["name"] = serde_json::json!("");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let source = Open5eSource::new(reqwest::Client::new(), server.uri());
        let err = source.lookup(&SpellQuery::parse("Fireball")).await.unwrap_err();

        assert!(matches!(err, ActionError::InvalidPayload(_)));
    }

    #[test]
    fn test_optional_fields_default() {
        let mut body = fireball_json();
        let object = body.as_object_mut().unwrap();
        for key in ["higher_level", "material", "page", "ritual", "concentration", "archetype", "circles"] {
            object.remove(key);
        }

        let spell: SpellResponse = serde_json::from_value(body).unwrap();
        assert_eq!(spell.higher_level, "");
        assert!(!spell.is_ritual());
    }
}
