//! Per-cell visual formatting.
//!
//! Entries are keyed by `"{rowId}:{field}"`. The store is merge-only:
//! an entry is created on the first formatting action for a cell, later
//! updates overlay the fields they set, and nothing is ever removed.
//!
//! Updates never mutate a store in place. They return a new
//! [`FormattingStore`] so callers can detect changes by identity
//! ([`FormattingStore::ptr_eq`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::row::RowId;
use super::value::CellValue;

/// Address of a cell: row id + field.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CellKey {
    pub row_id: RowId,
    pub field: String,
}

impl CellKey {
    pub fn new(row_id: impl Into<RowId>, field: &str) -> CellKey {
        CellKey {
            row_id: row_id.into(),
            field: field.to_string(),
        }
    }

    /// Parse a `"{rowId}:{field}"` key. The row id ends at the first `:`.
    pub fn parse(key: &str) -> Option<CellKey> {
        let (row_id, field) = key.split_once(':')?;
        if row_id.is_empty() || field.is_empty() {
            return None;
        }
        Some(CellKey::new(row_id, field))
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row_id, self.field)
    }
}

/// Formatting attributes of one cell. Every attribute is optional; in a
/// patch, `None` means "leave as is".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    /// Value cached by numeric bulk edits.
    #[serde(skip)]
    pub raw_value: Option<CellValue>,
}

impl FormattingEntry {
    pub fn fill(color: &str) -> FormattingEntry {
        FormattingEntry {
            fill_color: Some(color.to_string()),
            ..Default::default()
        }
    }

    pub fn text(color: &str) -> FormattingEntry {
        FormattingEntry {
            text_color: Some(color.to_string()),
            ..Default::default()
        }
    }

    /// Overlay every attribute `patch` sets onto `self`.
    pub fn merge(&mut self, patch: &FormattingEntry) {
        fn overlay<T: Clone>(slot: &mut Option<T>, patch: &Option<T>) {
            if let Some(v) = patch {
                *slot = Some(v.clone());
            }
        }
        overlay(&mut self.fill_color, &patch.fill_color);
        overlay(&mut self.text_color, &patch.text_color);
        overlay(&mut self.bold, &patch.bold);
        overlay(&mut self.italic, &patch.italic);
        overlay(&mut self.underline, &patch.underline);
        overlay(&mut self.strikethrough, &patch.strikethrough);
        overlay(&mut self.raw_value, &patch.raw_value);
    }
}

/// Mapping from cell key to formatting.
#[derive(Clone, Debug, Default)]
pub struct FormattingStore {
    entries: Arc<HashMap<CellKey, FormattingEntry>>,
}

impl FormattingStore {
    pub fn new() -> FormattingStore {
        FormattingStore::default()
    }

    pub fn get(&self, key: &CellKey) -> Option<&FormattingEntry> {
        self.entries.get(key)
    }

    pub fn lookup(&self, row_id: &RowId, field: &str) -> Option<&FormattingEntry> {
        self.get(&CellKey {
            row_id: row_id.clone(),
            field: field.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &FormattingEntry)> {
        self.entries.iter()
    }

    /// True when both handles share the same underlying map.
    pub fn ptr_eq(&self, other: &FormattingStore) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Merge a patch into one cell's entry, returning the new store.
    pub fn merge_update(&self, key: CellKey, patch: &FormattingEntry) -> FormattingStore {
        self.merge_many(std::iter::once((key, patch.clone())))
    }

    /// Merge a batch of patches in a single replacement.
    pub fn merge_many<I>(&self, patches: I) -> FormattingStore
    where
        I: IntoIterator<Item = (CellKey, FormattingEntry)>,
    {
        let mut entries = (*self.entries).clone();
        for (key, patch) in patches {
            entries.entry(key).or_default().merge(&patch);
        }
        FormattingStore {
            entries: Arc::new(entries),
        }
    }
}

impl FromIterator<(CellKey, FormattingEntry)> for FormattingStore {
    fn from_iter<I: IntoIterator<Item = (CellKey, FormattingEntry)>>(iter: I) -> Self {
        FormattingStore::new().merge_many(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_roundtrip_display() {
        let key = CellKey::new(12u64, "price");
        assert_eq!(key.to_string(), "12:price");
        assert_eq!(CellKey::parse("12:price"), Some(key));
        assert_eq!(
            CellKey::parse("7:a:b").map(|k| k.field),
            Some("a:b".to_string())
        );
        assert_eq!(CellKey::parse("nofield"), None);
        assert_eq!(CellKey::parse(":x"), None);
    }

    #[test]
    fn test_merge_keeps_untouched_attributes() {
        let store = FormattingStore::new()
            .merge_update(CellKey::new(1u64, "name"), &FormattingEntry::fill("red"));
        let patch = FormattingEntry {
            bold: Some(true),
            ..Default::default()
        };
        let store = store.merge_update(CellKey::new(1u64, "name"), &patch);
        let entry = store.get(&CellKey::new(1u64, "name")).unwrap();
        assert_eq!(entry.fill_color.as_deref(), Some("red"));
        assert_eq!(entry.bold, Some(true));
    }

    #[test]
    fn test_update_returns_new_store() {
        let before = FormattingStore::new();
        let after = before.merge_update(CellKey::new(1u64, "a"), &FormattingEntry::text("blue"));
        assert!(!before.ptr_eq(&after));
        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
        let copy = after.clone();
        assert!(copy.ptr_eq(&after));
    }
}
