//! Spell field record shared by every spell source.

use std::collections::BTreeMap;

/// The fixed set of spell attributes we know how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpellField {
    Level,
    CastingTime,
    Range,
    Duration,
    RangeArea,
    Components,
    School,
    Description,
    HigherLevels,
    Classes,
    Material,
    AttackSave,
    DamageEffect,
}

impl SpellField {
    /// Display title, also used to derive statblock class names.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Level => "Level",
            Self::CastingTime => "Casting Time",
            Self::Range => "Range",
            Self::Duration => "Duration",
            Self::RangeArea => "Range/Area",
            Self::Components => "Components",
            Self::School => "School",
            Self::Description => "Description",
            Self::HigherLevels => "Higher Levels",
            Self::Classes => "Classes",
            Self::Material => "Material",
            Self::AttackSave => "Attack/Save",
            Self::DamageEffect => "Damage/Effect",
        }
    }

    /// Whether the value is short enough to share a row with other fields.
    pub fn is_short(&self) -> bool {
        !matches!(self, Self::Description | Self::HigherLevels)
    }
}

impl std::fmt::Display for SpellField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Extracted display values keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    values: BTreeMap<SpellField, String>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for a field, replacing any previous value.
    pub fn insert(&mut self, field: SpellField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, field: SpellField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: SpellField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A resolved spell ready for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellSheet {
    /// Message headline, e.g. `Description for Fireball`.
    pub headline: String,
    /// Extracted attributes.
    pub record: FieldRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_titles() {
        assert_eq!(SpellField::CastingTime.title(), "Casting Time");
        assert_eq!(SpellField::AttackSave.to_string(), "Attack/Save");
        assert!(SpellField::Level.is_short());
        assert!(!SpellField::Description.is_short());
        assert!(!SpellField::HigherLevels.is_short());
    }

    #[test]
    fn test_record_insert_replaces() {
        let mut record = FieldRecord::new().with(SpellField::Level, "1st");
        record.insert(SpellField::Level, "2nd");

        assert_eq!(record.get(SpellField::Level), Some("2nd"));
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(SpellField::School), None);
        assert!(!record.is_empty());
        assert!(FieldRecord::new().is_empty());
    }
}
