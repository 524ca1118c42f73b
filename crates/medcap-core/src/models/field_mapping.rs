use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every field a caption template may reference. The mapping handed to the
/// renderer must be total over this set; startup validation rejects templates
/// naming anything else.
pub const CANONICAL_FIELDS: &[&str] = &[
    "title",
    "year",
    "quality",
    "resolution",
    "season",
    "episode",
    "ext",
    "artist",
    "language",
    "duration",
    "height",
    "width",
    "mime_type",
    "filename",
    "filesize",
    "caption",
    "wish",
];

/// The named metadata values derived for one media item.
///
/// Built fresh per incoming item and discarded after rendering and
/// persistence; never shared across items. Backed by a BTreeMap so the
/// serialized document has a stable key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical fields this mapping does not yet define.
    pub fn missing_canonical(&self) -> Vec<&'static str> {
        CANONICAL_FIELDS
            .iter()
            .copied()
            .filter(|field| !self.0.contains_key(*field))
            .collect()
    }
}

impl FromIterator<(String, String)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
