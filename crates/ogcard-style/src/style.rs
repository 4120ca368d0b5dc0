//! Inline style maps.

use std::collections::BTreeMap;

use serde::Serialize;

/// An ordered map of CSS property names to values.
///
/// Property names are kebab-case (`font-size`, `justify-content`). Ordering is
/// by property name so two maps built from the same classes always compare
/// and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    /// Create an empty style map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value.
    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    /// Look up a property value.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    /// Merge another map into this one. Properties from `other` win.
    pub fn merge(mut self, other: StyleMap) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Iterate over `(property, value)` pairs in property order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_later_values() {
        let base: StyleMap = [("color", "red"), ("display", "flex")].into_iter().collect();
        let over: StyleMap = [("color", "white")].into_iter().collect();

        let merged = base.merge(over);

        assert_eq!(merged.get("color"), Some("white"));
        assert_eq!(merged.get("display"), Some("flex"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn iterates_in_property_order() {
        let style: StyleMap = [("width", "100%"), ("color", "#fff")].into_iter().collect();

        let pairs: Vec<_> = style.iter().collect();

        assert_eq!(pairs, vec![("color", "#fff"), ("width", "100%")]);
    }
}
