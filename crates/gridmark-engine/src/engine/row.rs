//! Row snapshot model.
//!
//! Rows are treated as immutable: every transform returns a new [`Row`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::CellValue;

/// Stable identifier of a row within a snapshot.
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> RowId {
        RowId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

impl From<u64> for RowId {
    fn from(n: u64) -> Self {
        RowId(n.to_string())
    }
}

impl From<i64> for RowId {
    fn from(n: i64) -> Self {
        RowId(n.to_string())
    }
}

/// A row: stable id plus an ordered field -> value mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub id: RowId,
    fields: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new(id: impl Into<RowId>) -> Row {
        Row {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field insertion; replaces an existing field in place.
    pub fn with(mut self, field: &str, value: impl Into<CellValue>) -> Row {
        self.put(field, value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Return a copy of this row with `field` set to `value`.
    pub fn with_value(&self, field: &str, value: CellValue) -> Row {
        let mut next = self.clone();
        next.put(field, value);
        next
    }

    fn put(&mut self, field: &str, value: CellValue) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_replaces_in_place() {
        let row = Row::new(1u64).with("a", 1.0).with("b", "x").with("a", 2.0);
        let names: Vec<&str> = row.field_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_with_value_leaves_original_untouched() {
        let row = Row::new("r1").with("name", "John");
        let edited = row.with_value("name", CellValue::text("Jane"));
        assert_eq!(row.get("name"), Some(&CellValue::text("John")));
        assert_eq!(edited.get("name"), Some(&CellValue::text("Jane")));
        assert_eq!(edited.id, row.id);
    }

    #[test]
    fn test_row_id_display() {
        assert_eq!(RowId::from(7u64).to_string(), "7");
        assert_eq!(RowId::from("abc").as_str(), "abc");
    }
}
