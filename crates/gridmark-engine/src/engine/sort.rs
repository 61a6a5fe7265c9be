//! Multi-column sort.
//!
//! A [`SortModel`] is the ordered list of active [`SortLevel`]s. Key
//! invariants:
//! - at most one level per field;
//! - priorities are 1-based and contiguous, in list order;
//! - setting a sort on a field removes its old level first and appends the
//!   new one at the end, so the most recently sorted column is always the
//!   lowest tie-break priority. Levels are never reordered in place.
//!
//! [`apply_multi_column_sort`] runs the levels in array order over a
//! caller-supplied snapshot; the model keeps no copy of the rows.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::compare::{RowComparator, SortDirection, SortType, make_comparator};
use super::projection::SortKeyTable;
use super::row::Row;

/// One column's contribution to a multi-column sort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortLevel {
    pub field: String,
    #[serde(rename = "type", default)]
    pub sort_type: SortType,
    pub direction: SortDirection,
    pub priority: usize,
}

impl SortLevel {
    pub fn new(field: &str, sort_type: SortType, direction: SortDirection) -> SortLevel {
        SortLevel {
            field: field.to_string(),
            sort_type,
            direction,
            priority: 0,
        }
    }
}

/// Ordered list of active sort levels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortModel {
    levels: Vec<SortLevel>,
}

impl SortModel {
    pub fn new() -> SortModel {
        SortModel::default()
    }

    /// Build a model from levels in tie-break order. Later duplicates of a
    /// field replace earlier ones (remove, then append).
    pub fn from_levels(levels: impl IntoIterator<Item = SortLevel>) -> SortModel {
        levels.into_iter().fold(SortModel::new(), |model, level| {
            model.with_level(&level.field, level.sort_type, Some(level.direction))
        })
    }

    pub fn levels(&self) -> &[SortLevel] {
        &self.levels
    }

    pub fn level(&self, field: &str) -> Option<&SortLevel> {
        self.levels.iter().find(|l| l.field == field)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Sort `field` ascending; it becomes the last level.
    pub fn sort_ascending(&self, field: &str, sort_type: SortType) -> SortModel {
        self.with_level(field, sort_type, Some(SortDirection::Asc))
    }

    /// Sort `field` descending; it becomes the last level.
    pub fn sort_descending(&self, field: &str, sort_type: SortType) -> SortModel {
        self.with_level(field, sort_type, Some(SortDirection::Desc))
    }

    /// Drop any level for `field`.
    pub fn cleared(&self, field: &str) -> SortModel {
        self.with_level(field, SortType::default(), None)
    }

    /// Header-click cycle: unsorted -> asc -> desc -> unsorted.
    pub fn toggle(&self, field: &str, sort_type: SortType) -> SortModel {
        match self.level(field).map(|l| l.direction) {
            None => self.sort_ascending(field, sort_type),
            Some(SortDirection::Asc) => self.sort_descending(field, sort_type),
            Some(SortDirection::Desc) => self.cleared(field),
        }
    }

    fn with_level(
        &self,
        field: &str,
        sort_type: SortType,
        direction: Option<SortDirection>,
    ) -> SortModel {
        let mut levels: Vec<SortLevel> = self
            .levels
            .iter()
            .filter(|l| l.field != field)
            .cloned()
            .collect();
        if let Some(direction) = direction {
            levels.push(SortLevel::new(field, sort_type, direction));
        }
        for (idx, level) in levels.iter_mut().enumerate() {
            level.priority = idx + 1;
        }
        log::debug!(
            "sort model: {}",
            levels
                .iter()
                .map(|l| format!("{}#{} {} {}", l.field, l.priority, l.sort_type, l.direction))
                .collect::<Vec<_>>()
                .join(", ")
        );
        SortModel { levels }
    }
}

/// Sort a snapshot by `levels`, in array order.
///
/// With no levels the input order is returned unchanged. Otherwise a copy
/// is stably sorted: the first level with a non-equal result decides, and
/// rows that tie on every level keep their relative order.
pub fn apply_multi_column_sort(rows: &[Row], levels: &[SortLevel], keys: &SortKeyTable) -> Vec<Row> {
    let mut sorted = rows.to_vec();
    if levels.is_empty() {
        return sorted;
    }
    let comparators: Vec<RowComparator<'_>> = levels
        .iter()
        .map(|l| make_comparator(l.sort_type, l.direction, &l.field, keys))
        .collect();
    sorted.sort_by(|a, b| {
        comparators
            .iter()
            .map(|cmp| cmp(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    log::debug!("sorted {} rows by {} level(s)", sorted.len(), levels.len());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::value::CellValue;
    use pretty_assertions::assert_eq;

    fn fields(model: &SortModel) -> Vec<(&str, usize)> {
        model
            .levels()
            .iter()
            .map(|l| (l.field.as_str(), l.priority))
            .collect()
    }

    #[test]
    fn test_resorting_moves_field_to_end() {
        let model = SortModel::new()
            .sort_ascending("a", SortType::Numeric)
            .sort_ascending("b", SortType::Alphanumeric);
        assert_eq!(fields(&model), vec![("a", 1), ("b", 2)]);
        let model = model.sort_ascending("a", SortType::Numeric);
        assert_eq!(fields(&model), vec![("b", 1), ("a", 2)]);
    }

    #[test]
    fn test_clear_renumbers() {
        let model = SortModel::new()
            .sort_ascending("a", SortType::Numeric)
            .sort_descending("b", SortType::Numeric)
            .sort_ascending("c", SortType::Numeric)
            .cleared("a");
        assert_eq!(fields(&model), vec![("b", 1), ("c", 2)]);
        assert_eq!(model.cleared("zzz"), model);
    }

    #[test]
    fn test_sole_level_direction_change_keeps_priority_one() {
        let model = SortModel::new().sort_ascending("a", SortType::Numeric);
        let model = model.sort_descending("a", SortType::Numeric);
        assert_eq!(fields(&model), vec![("a", 1)]);
        assert_eq!(model.levels()[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_toggle_cycle() {
        let m = SortModel::new().toggle("a", SortType::Alphanumeric);
        assert_eq!(m.level("a").map(|l| l.direction), Some(SortDirection::Asc));
        let m = m.toggle("a", SortType::Alphanumeric);
        assert_eq!(m.level("a").map(|l| l.direction), Some(SortDirection::Desc));
        let m = m.toggle("a", SortType::Alphanumeric);
        assert!(m.is_empty());
    }

    #[test]
    fn test_from_levels_dedupes_by_field() {
        let model = SortModel::from_levels(vec![
            SortLevel::new("a", SortType::Numeric, SortDirection::Asc),
            SortLevel::new("b", SortType::Numeric, SortDirection::Asc),
            SortLevel::new("a", SortType::Numeric, SortDirection::Desc),
        ]);
        assert_eq!(fields(&model), vec![("b", 1), ("a", 2)]);
    }

    #[test]
    fn test_tie_break_by_level_order() {
        let rows = vec![
            Row::new(1u64).with("a", 1.0).with("b", "x"),
            Row::new(2u64).with("a", 2.0).with("b", "y"),
            Row::new(3u64).with("a", 1.0).with("b", "y"),
        ];
        let model = SortModel::new()
            .sort_ascending("a", SortType::Numeric)
            .sort_descending("b", SortType::Alphanumeric);
        let sorted = apply_multi_column_sort(&rows, model.levels(), &SortKeyTable::new());
        let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_empty_levels_is_identity() {
        let rows = vec![Row::new(2u64).with("a", 2.0), Row::new(1u64).with("a", 1.0)];
        assert_eq!(apply_multi_column_sort(&rows, &[], &SortKeyTable::new()), rows);
    }

    #[test]
    fn test_full_tie_is_stable() {
        let rows: Vec<Row> = (0..6u64)
            .map(|i| Row::new(i).with("k", CellValue::text(if i % 2 == 0 { "x" } else { "y" })))
            .collect();
        let levels = [SortLevel::new("k", SortType::Alphanumeric, SortDirection::Asc)];
        let sorted = apply_multi_column_sort(&rows, &levels, &SortKeyTable::new());
        let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "2", "4", "1", "3", "5"]);
    }
}
