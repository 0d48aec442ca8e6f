use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::RecordId;

/// A typed property value as stored on a record.
///
/// Only the property kinds the tagger reads or writes are modelled; everything
/// else is kept as `Unsupported` with the store's type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Title text, as a list of plain-text runs.
    Title(Vec<String>),
    /// Rich text, as a list of plain-text runs.
    RichText(Vec<String>),
    /// A URL, possibly unset.
    Url(Option<String>),
    /// The selected option name, if any.
    Select(Option<String>),
    /// Selected option names in display order.
    MultiSelect(Vec<String>),
    /// Start of a date property, as the raw ISO 8601 string.
    Date(Option<String>),
    /// Any property kind the tagger does not understand.
    Unsupported(String),
}

/// One item in the structured record store.
///
/// Records are owned by the store. The pipeline only reads them and issues a
/// partial update through [`crate::notion::RecordStore::write_tags`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    properties: HashMap<String, PropertyValue>,
    last_edited_time: Option<String>,
}

impl Record {
    /// Returns the record identifier.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the property with the given name, if present.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Returns all properties keyed by name.
    pub fn properties(&self) -> &HashMap<String, PropertyValue> {
        &self.properties
    }

    /// Returns the raw last-modified timestamp reported by the store.
    pub fn last_edited_time(&self) -> Option<&str> {
        self.last_edited_time.as_deref()
    }

    /// Returns the raw tagged-at timestamp held in the named date property.
    ///
    /// Returns `None` when the property is missing, is not a date, or is unset.
    pub fn tagged_at(&self, property: &str) -> Option<&str> {
        match self.properties.get(property) {
            Some(PropertyValue::Date(Some(start))) => Some(start.as_str()),
            _ => None,
        }
    }
}

/// Builder for constructing `Record` instances.
///
/// # Examples
///
/// ```
/// use notion_tagger::models::{PropertyValue, RecordBuilder};
///
/// let record = RecordBuilder::new("page-1")
///     .property("Name", PropertyValue::Title(vec!["Rust traits".to_string()]))
///     .last_edited_time("2025-01-01T00:00:00.000Z")
///     .build();
///
/// assert_eq!(record.id().as_str(), "page-1");
/// assert!(record.property("Name").is_some());
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    id: RecordId,
    properties: HashMap<String, PropertyValue>,
    last_edited_time: Option<String>,
}

impl RecordBuilder {
    /// Creates a builder for a record with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            properties: HashMap::new(),
            last_edited_time: None,
        }
    }

    /// Adds or replaces a property.
    pub fn property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Sets the raw last-modified timestamp.
    pub fn last_edited_time(mut self, timestamp: impl Into<String>) -> Self {
        self.last_edited_time = Some(timestamp.into());
        self
    }

    /// Builds the `Record`.
    pub fn build(self) -> Record {
        Record {
            id: self.id,
            properties: self.properties,
            last_edited_time: self.last_edited_time,
        }
    }
}
