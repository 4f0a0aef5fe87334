//! Record data types
//!
//! Defines the cell and record types shared by the cache and metrics layers.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Raw spreadsheet grid: the first row holds the headers
pub type RawGrid = Vec<Vec<Cell>>;

/// A single spreadsheet cell as returned by the values API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Formatted text (the default render option)
    Text(String),
    /// Unformatted numeric value
    Number(f64),
    /// Boolean checkbox value
    Bool(bool),
    /// Explicit empty cell
    Null,
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// One member row keyed by header name
///
/// Fields keep the order in which headers appeared. A field that the source
/// row did not reach is absent (`get` returns `None`), which is distinct from
/// a field holding [`Cell::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, overwriting any earlier value with the same name in place
    pub fn insert(&mut self, field: impl Into<String>, value: Cell) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.insert(field, value.into());
        self
    }

    /// Look up a field; `None` means the field is absent from this record
    pub fn get(&self, field: &str) -> Option<&Cell> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
