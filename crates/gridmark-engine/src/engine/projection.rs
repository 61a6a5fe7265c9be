//! Sort key projection.
//!
//! Formatting attributes (fill and text color) become synthetic sort keys
//! so the color comparators can run through the same machinery as data
//! comparators. Rows are left untouched: the keys live in a side-table
//! keyed by row id and synthetic field name (`__bgColor_{field}`,
//! `__fontColor_{field}`).
//!
//! A field without formatting gets no entry at all. Comparators read a
//! missing key as the empty string.

use std::collections::HashMap;

use super::formatting::FormattingStore;
use super::row::{Row, RowId};

/// Which formatting attribute a synthetic key is derived from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntheticKind {
    FillColor,
    FontColor,
}

impl SyntheticKind {
    fn prefix(self) -> &'static str {
        match self {
            SyntheticKind::FillColor => "__bgColor_",
            SyntheticKind::FontColor => "__fontColor_",
        }
    }
}

/// Name of the synthetic field for `field`, e.g. `__bgColor_name`.
pub fn synthetic_field(kind: SyntheticKind, field: &str) -> String {
    format!("{}{}", kind.prefix(), field)
}

/// Side-table of synthetic sort keys: synthetic field -> row id -> value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortKeyTable {
    columns: HashMap<String, HashMap<RowId, String>>,
}

impl SortKeyTable {
    pub fn new() -> SortKeyTable {
        SortKeyTable::default()
    }

    pub fn get(&self, row_id: &RowId, synthetic: &str) -> Option<&str> {
        self.columns
            .get(synthetic)
            .and_then(|column| column.get(row_id))
            .map(String::as_str)
    }

    /// Synthetic key for `field` of `kind` on a row, if one was projected.
    pub fn key_for(&self, row_id: &RowId, kind: SyntheticKind, field: &str) -> Option<&str> {
        self.column(kind, field)
            .and_then(|column| column.get(row_id))
            .map(String::as_str)
    }

    /// All projected keys of one synthetic field, by row id. `None` when
    /// no row carries that attribute.
    pub fn column(&self, kind: SyntheticKind, field: &str) -> Option<&HashMap<RowId, String>> {
        self.columns.get(&synthetic_field(kind, field))
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, row_id: &RowId, synthetic: String, value: &str) {
        self.columns
            .entry(synthetic)
            .or_default()
            .insert(row_id.clone(), value.to_string());
    }
}

/// Project the formatting store onto a row snapshot.
///
/// Every call starts from an empty table, so repeated calls with the same
/// inputs yield identical tables. Run it before every sort, since
/// formatting changes independently of row data.
pub fn preprocess_rows(rows: &[Row], formatting: &FormattingStore) -> SortKeyTable {
    let mut table = SortKeyTable::new();
    if formatting.is_empty() {
        return table;
    }
    for row in rows {
        for field in row.field_names() {
            let Some(entry) = formatting.lookup(&row.id, field) else {
                continue;
            };
            if let Some(fill) = &entry.fill_color {
                table.insert(&row.id, synthetic_field(SyntheticKind::FillColor, field), fill);
            }
            if let Some(text) = &entry.text_color {
                table.insert(&row.id, synthetic_field(SyntheticKind::FontColor, field), text);
            }
        }
    }
    log::trace!("projected {} synthetic sort keys over {} rows", table.len(), rows.len());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::formatting::{CellKey, FormattingEntry};

    fn rows() -> Vec<Row> {
        vec![
            Row::new(1u64).with("name", "Ann").with("age", 30.0),
            Row::new(2u64).with("name", "Bob").with("age", 25.0),
        ]
    }

    #[test]
    fn test_projects_fill_and_text_colors() {
        let store = FormattingStore::new()
            .merge_update(CellKey::new(1u64, "name"), &FormattingEntry::fill("red"))
            .merge_update(CellKey::new(2u64, "age"), &FormattingEntry::text("blue"));
        let table = preprocess_rows(&rows(), &store);
        assert_eq!(table.get(&RowId::from(1u64), "__bgColor_name"), Some("red"));
        assert_eq!(table.get(&RowId::from(2u64), "__fontColor_age"), Some("blue"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unformatted_fields_get_no_key() {
        let store = FormattingStore::new().merge_update(
            CellKey::new(1u64, "name"),
            &FormattingEntry {
                bold: Some(true),
                ..Default::default()
            },
        );
        let table = preprocess_rows(&rows(), &store);
        assert!(table.is_empty());
        assert_eq!(
            table.key_for(&RowId::from(1u64), SyntheticKind::FillColor, "name"),
            None
        );
    }

    #[test]
    fn test_formatting_for_absent_field_is_ignored() {
        let store = FormattingStore::new()
            .merge_update(CellKey::new(1u64, "missing"), &FormattingEntry::fill("red"));
        assert!(preprocess_rows(&rows(), &store).is_empty());
    }

    #[test]
    fn test_preprocess_is_idempotent() {
        let store = FormattingStore::new()
            .merge_update(CellKey::new(1u64, "name"), &FormattingEntry::fill("red"));
        let first = preprocess_rows(&rows(), &store);
        let second = preprocess_rows(&rows(), &store);
        assert_eq!(first, second);
    }

    #[test]
    fn test_column_lookup() {
        let store = FormattingStore::new()
            .merge_update(CellKey::new(1u64, "name"), &FormattingEntry::fill("red"))
            .merge_update(CellKey::new(2u64, "age"), &FormattingEntry::text("blue"));
        let table = preprocess_rows(&rows(), &store);
        let fills = table.column(SyntheticKind::FillColor, "name").unwrap();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills.get(&RowId::from(1u64)).map(String::as_str), Some("red"));
        assert!(table.column(SyntheticKind::FontColor, "name").is_none());
        assert!(table.column(SyntheticKind::FillColor, "missing").is_none());
    }
}
