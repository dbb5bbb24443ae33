//! Structural extraction of spell attributes from statblock HTML.
//!
//! Spell pages mark every attribute up as
//!
//! ```html
//! <div class="statblock-item statblock-item-casting-time">
//!   <div class="statblock-item-label">Casting Time</div>
//!   <div class="statblock-item-value">1 Action</div>
//! </div>
//! ```
//!
//! Most values are the first text child of the value node. A few attributes
//! wrap their text in extra markup, so each field has a navigation recipe
//! applied from the value node.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

use crate::record::{FieldRecord, SpellField};

/// Class of the node holding an attribute's value.
pub const VALUE_CLASS: &str = "statblock-item-value";

/// Class marking the upstream "page not found" document.
pub const NOT_FOUND_CLASS: &str = "error-page error-page-404";

const ITEM_CLASS_PREFIX: &str = "statblock-item statblock-item-";

/// One navigation move from the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FirstChild,
    LastChild,
    PrevSibling,
    NextSibling,
}

/// Where to find a field's text relative to its value node.
#[derive(Debug, Clone, Copy)]
pub struct FieldRecipe {
    pub field: SpellField,
    pub steps: &'static [Step],
}

const DEFAULT_STEPS: &[Step] = &[Step::FirstChild];

const RECIPES: &[FieldRecipe] = &[
    FieldRecipe {
        field: SpellField::AttackSave,
        steps: &[Step::LastChild, Step::PrevSibling, Step::FirstChild],
    },
    FieldRecipe {
        field: SpellField::DamageEffect,
        steps: &[Step::LastChild],
    },
    FieldRecipe {
        field: SpellField::Components,
        steps: &[Step::FirstChild, Step::NextSibling, Step::FirstChild],
    },
];

/// Navigation recipe for a field.
pub fn steps_for(field: SpellField) -> &'static [Step] {
    RECIPES
        .iter()
        .find(|recipe| recipe.field == field)
        .map_or(DEFAULT_STEPS, |recipe| recipe.steps)
}

/// Class of the statblock item wrapping a field, e.g.
/// `statblock-item statblock-item-range-area` for `Range/Area`.
pub fn item_class(field: SpellField) -> String {
    let slug = field.title().to_lowercase().replace(['/', ' '], "-");
    format!("{}{}", ITEM_CLASS_PREFIX, slug)
}

/// First element whose `class` attribute equals `class_name` exactly.
///
/// Pre-order depth-first: `root` itself is checked before its children and
/// children are visited in document order.
pub fn find_by_class<'a>(root: ElementRef<'a>, class_name: &str) -> Option<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().attr("class") == Some(class_name))
}

/// Extract the display text of one field, `None` if any step is missing.
pub fn extract_field(root: ElementRef<'_>, field: SpellField) -> Option<String> {
    let class_name = item_class(field);
    let Some(item) = find_by_class(root, &class_name) else {
        debug!("failed to find statblock item {}", class_name);
        return None;
    };
    let Some(value) = find_by_class(item, VALUE_CLASS) else {
        debug!("failed to find value for attribute {}", field);
        return None;
    };

    let mut node = *value;
    for step in steps_for(field) {
        node = match step {
            Step::FirstChild => node.first_child(),
            Step::LastChild => node.last_child(),
            Step::PrevSibling => node.prev_sibling(),
            Step::NextSibling => node.next_sibling(),
        }?;
    }

    match node.value() {
        Node::Text(text) => Some(text.trim().to_string()),
        _ => {
            debug!("attribute {} did not resolve to a text node", field);
            None
        }
    }
}

/// A parsed statblock page.
pub struct StatblockDocument {
    html: Html,
}

impl std::fmt::Debug for StatblockDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatblockDocument").finish_non_exhaustive()
    }
}

impl StatblockDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Whether this is the upstream's not-found page.
    pub fn is_not_found(&self) -> bool {
        find_by_class(self.html.root_element(), NOT_FOUND_CLASS).is_some()
    }

    pub fn field(&self, field: SpellField) -> Option<String> {
        extract_field(self.html.root_element(), field)
    }

    /// Extract every requested field.
    ///
    /// Each field is attempted independently; on failure the full list of
    /// missing fields is returned and nothing partial escapes.
    pub fn extract_all(&self, fields: &[SpellField]) -> Result<FieldRecord, Vec<SpellField>> {
        let mut record = FieldRecord::new();
        let mut missing = Vec::new();

        for &field in fields {
            match self.field(field) {
                Some(value) => record.insert(field, value),
                None => missing.push(field),
            }
        }

        if missing.is_empty() {
            Ok(record)
        } else {
            Err(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREBALL_PAGE: &str = include_str!("../tests/fixtures/fireball.html");

    fn root(html: &Html) -> ElementRef<'_> {
        html.root_element()
    }

    #[test]
    fn test_item_class() {
        assert_eq!(
            item_class(SpellField::CastingTime),
            "statblock-item statblock-item-casting-time"
        );
        assert_eq!(
            item_class(SpellField::RangeArea),
            "statblock-item statblock-item-range-area"
        );
        assert_eq!(
            item_class(SpellField::DamageEffect),
            "statblock-item statblock-item-damage-effect"
        );
    }

    #[test]
    fn test_find_by_class_preorder_first_match() {
        let html = Html::parse_document(
            r#"<div id="outer" class="target">
                 <p id="child" class="target"></p>
               </div>
               <div id="later" class="target"></div>"#,
        );
        let found = find_by_class(root(&html), "target").unwrap();
        assert_eq!(found.value().attr("id"), Some("outer"));
    }

    #[test]
    fn test_find_by_class_depth_before_siblings() {
        let html = Html::parse_document(
            r#"<div><section><span id="deep" class="hit"></span></section></div>
               <span id="shallow" class="hit"></span>"#,
        );
        let found = find_by_class(root(&html), "hit").unwrap();
        assert_eq!(found.value().attr("id"), Some("deep"));
    }

    #[test]
    fn test_find_by_class_checks_self() {
        let html = Html::parse_fragment(r#"<div id="me" class="x"><div class="x"></div></div>"#);
        let outer = find_by_class(root(&html), "x").unwrap();
        let again = find_by_class(outer, "x").unwrap();
        assert_eq!(again.value().attr("id"), Some("me"));
    }

    #[test]
    fn test_find_by_class_exact_match_only() {
        let html = Html::parse_document(r#"<div class="statblock-item other"></div>"#);
        assert!(find_by_class(root(&html), "statblock-item").is_none());
        assert!(find_by_class(root(&html), "missing").is_none());
        assert!(find_by_class(root(&html), "statblock-item other").is_some());
    }

    #[test]
    fn test_extract_default_fields() {
        let doc = StatblockDocument::parse(FIREBALL_PAGE);

        assert_eq!(doc.field(SpellField::Level).as_deref(), Some("3rd"));
        assert_eq!(doc.field(SpellField::CastingTime).as_deref(), Some("1 Action"));
        assert_eq!(
            doc.field(SpellField::RangeArea).as_deref(),
            Some("150 ft. (20 ft.)")
        );
        assert_eq!(doc.field(SpellField::School).as_deref(), Some("Evocation"));
    }

    #[test]
    fn test_extract_positional_fields() {
        let doc = StatblockDocument::parse(FIREBALL_PAGE);

        assert_eq!(doc.field(SpellField::Components).as_deref(), Some("V, S, M *"));
        assert_eq!(doc.field(SpellField::AttackSave).as_deref(), Some("DEX Save"));
        assert_eq!(doc.field(SpellField::DamageEffect).as_deref(), Some("Fire"));
    }

    #[test]
    fn test_extract_missing_step_is_not_found() {
        let page = r#"<div class="statblock-item statblock-item-components">
                        <div class="statblock-item-value">V, S</div>
                      </div>
                      <div class="statblock-item statblock-item-level">
                        <div class="statblock-item-value"></div>
                      </div>"#;
        let doc = StatblockDocument::parse(page);

        // text child has no next sibling
        assert_eq!(doc.field(SpellField::Components), None);
        // empty value node has no children
        assert_eq!(doc.field(SpellField::Level), None);
        // no item at all
        assert_eq!(doc.field(SpellField::School), None);
    }

    #[test]
    fn test_extract_all_reports_every_missing_field() {
        let page = r#"<div class="statblock-item statblock-item-level">
                        <div class="statblock-item-value">1st</div>
                      </div>"#;
        let doc = StatblockDocument::parse(page);

        let missing = doc
            .extract_all(&[SpellField::Level, SpellField::School, SpellField::Duration])
            .unwrap_err();
        assert_eq!(missing, vec![SpellField::School, SpellField::Duration]);

        let record = doc.extract_all(&[SpellField::Level]).unwrap();
        assert_eq!(record.get(SpellField::Level), Some("1st"));
    }

    #[test]
    fn test_not_found_marker() {
        let doc = StatblockDocument::parse(
            r#"<html><body><div class="error-page error-page-404">Not found</div></body></html>"#,
        );
        assert!(doc.is_not_found());

        let doc = StatblockDocument::parse(FIREBALL_PAGE);
        assert!(!doc.is_not_found());
    }
}
