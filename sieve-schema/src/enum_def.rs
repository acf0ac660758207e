//! Enum definitions with per-locale display labels.
//!
//! The compiler sorts and searches enum fields by display label, not by the
//! raw stored value. The full value-to-label table therefore has to be
//! available at compile time, keyed by an explicitly passed locale — there
//! is no ambient translation state.

use std::collections::HashMap;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::{SchemaError, SchemaResult};

/// An enumerated type: its raw values and locale-keyed label tables.
#[derive(Debug, Clone, Default)]
pub struct EnumDef {
    /// Enum name, referenced by [`crate::FieldType::Enum`].
    pub name: SmolStr,
    values: Vec<SmolStr>,
    labels: HashMap<SmolStr, IndexMap<SmolStr, String>>,
}

impl EnumDef {
    /// Create an enum definition.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            labels: HashMap::new(),
        }
    }

    /// Set the raw values, in declaration order.
    pub fn values(mut self, values: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Add a label table for a locale. Values without an entry fall back to
    /// their raw value at lookup time.
    pub fn labels(
        mut self,
        locale: impl Into<SmolStr>,
        labels: impl IntoIterator<Item = (impl Into<SmolStr>, impl Into<String>)>,
    ) -> Self {
        self.labels.insert(
            locale.into(),
            labels
                .into_iter()
                .map(|(value, label)| (value.into(), label.into()))
                .collect(),
        );
        self
    }

    /// All raw values in declaration order.
    pub fn raw_values(&self) -> &[SmolStr] {
        &self.values
    }

    /// The (value, label) table for a locale, in declaration order of the
    /// label table.
    pub fn labels_for(&self, locale: &str) -> SchemaResult<&IndexMap<SmolStr, String>> {
        self.labels.get(locale).ok_or_else(|| SchemaError::LabelsMissing {
            name: self.name.to_string(),
            locale: locale.to_string(),
        })
    }

    /// The label for one value in a locale; raw values missing from the
    /// table fall back to themselves.
    pub fn label(&self, locale: &str, value: &str) -> SchemaResult<String> {
        let table = self.labels_for(locale)?;
        Ok(table
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_string()))
    }

    /// Raw values whose label for `locale` contains `needle`,
    /// case-insensitively. Used by the free-text search compiler.
    pub fn values_with_label_containing(
        &self,
        locale: &str,
        needle: &str,
    ) -> SchemaResult<Vec<SmolStr>> {
        let table = self.labels_for(locale)?;
        let needle = needle.to_lowercase();
        Ok(self
            .values
            .iter()
            .filter(|value| {
                let label = table
                    .get(value.as_str())
                    .map(String::as_str)
                    .unwrap_or(value.as_str());
                label.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_enum() -> EnumDef {
        EnumDef::new("Status")
            .values(["active", "blocked", "pending"])
            .labels("en", [("active", "Active"), ("blocked", "Blocked"), ("pending", "Pending review")])
            .labels("de", [("active", "Aktiv"), ("blocked", "Gesperrt"), ("pending", "In Prüfung")])
    }

    #[test]
    fn test_label_lookup() {
        let def = status_enum();
        assert_eq!(def.label("en", "blocked").unwrap(), "Blocked");
        assert_eq!(def.label("de", "blocked").unwrap(), "Gesperrt");
    }

    #[test]
    fn test_label_fallback_to_raw() {
        let def = EnumDef::new("Status")
            .values(["active", "legacy"])
            .labels("en", [("active", "Active")]);
        assert_eq!(def.label("en", "legacy").unwrap(), "legacy");
    }

    #[test]
    fn test_missing_locale() {
        let def = status_enum();
        let err = def.labels_for("fr").unwrap_err();
        assert!(matches!(err, SchemaError::LabelsMissing { .. }));
    }

    #[test]
    fn test_values_with_label_containing() {
        let def = status_enum();
        let hits = def.values_with_label_containing("en", "pend").unwrap();
        assert_eq!(hits, vec![SmolStr::new("pending")]);

        // Case-insensitive, matches labels not raw values.
        let hits = def.values_with_label_containing("de", "GESPERRT").unwrap();
        assert_eq!(hits, vec![SmolStr::new("blocked")]);
    }
}
