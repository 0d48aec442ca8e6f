use std::collections::BTreeMap;

use serde::Serialize;

/// Name of the synthetic field holding flattened body text.
pub const BODY_FIELD: &str = "body";

/// Plain text extracted from one record, keyed by field name.
///
/// Built fresh per record and discarded after tagging. Keys are kept sorted so
/// the serialized form (and therefore the prompt) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Content(BTreeMap<String, String>);

impl Content {
    /// Creates an empty `Content`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text for a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, text: impl Into<String>) {
        self.0.insert(field.into(), text.into());
    }

    /// Returns the text for a field, if it was extracted.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Number of extracted fields, including empty ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no field holds any non-whitespace text.
    ///
    /// Records with no content are skipped rather than tagged.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }

    /// Iterates over `(field, text)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the content as pretty-printed JSON for prompt embedding.
    pub fn to_json_pretty(&self) -> String {
        // A string map always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Content {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
