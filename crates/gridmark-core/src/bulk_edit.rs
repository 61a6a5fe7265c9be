//! Bulk edit: apply one value (and optionally formatting) to every cell of
//! a column-homogeneous multi-cell selection.
//!
//! A bulk edit is only offered when the selection, narrowed to the target
//! field if one is given, holds more than one cell and every cell shares
//! the same field. Anything else is a silent no-op.

use gridmark_engine::engine::{
    CellKey, CellValue, DataType, FormattingEntry, FormattingStore, Row, RowId, lenient_number_of,
};

use crate::selection::SelectionState;

/// Options of a bulk edit.
#[derive(Default)]
pub struct BulkEditConfig<'a> {
    /// Transform applied to the entered value before it is stored.
    pub format_value: Option<&'a dyn Fn(&CellValue) -> CellValue>,
    /// Formatting merged into every edited cell.
    pub formatting: Option<FormattingEntry>,
    /// Declared type of the column; numeric types cache a parsed raw value.
    pub data_type: Option<DataType>,
}

/// Result of [`apply_bulk_edit`]: replacement values for every piece of
/// state the edit touches.
#[derive(Clone, Debug)]
pub struct BulkEditOutcome {
    pub rows: Vec<Row>,
    pub formatting: FormattingStore,
    pub selection: SelectionState,
    pub cells_written: usize,
}

/// Field a bulk edit would apply to, or None when it is not offered.
pub fn bulk_edit_target(selection: &SelectionState, field: Option<&str>) -> Option<String> {
    let mut cells = selection
        .selected_cells()
        .iter()
        .filter(|c| field.is_none_or(|f| c.field == f));
    let first = cells.next()?;
    let mut count = 1;
    for cell in cells {
        if cell.field != first.field {
            return None;
        }
        count += 1;
    }
    (count > 1).then(|| first.field.clone())
}

pub fn can_bulk_edit(selection: &SelectionState, field: Option<&str>) -> bool {
    bulk_edit_target(selection, field).is_some()
}

/// Enter bulk-edit mode if a bulk edit is offered for `field`.
pub fn begin_bulk_edit(selection: &SelectionState, field: Option<&str>) -> SelectionState {
    match bulk_edit_target(selection, field) {
        Some(target) => {
            log::debug!("bulk edit started on '{}'", target);
            selection.with_bulk_edit_mode(true)
        }
        None => {
            log::debug!("bulk edit not offered for current selection");
            selection.clone()
        }
    }
}

/// Apply `value` to every selected cell of the target column.
///
/// Returns new rows, a new formatting store and a new selection (with
/// updated cell values). Bulk-edit mode is always off afterwards, even
/// when the edit was not offered and nothing changed.
pub fn apply_bulk_edit(
    rows: &[Row],
    selection: &SelectionState,
    formatting: &FormattingStore,
    field: Option<&str>,
    value: &CellValue,
    config: &BulkEditConfig<'_>,
) -> BulkEditOutcome {
    let Some(target) = bulk_edit_target(selection, field) else {
        log::debug!("bulk edit skipped: selection is not a multi-cell single-column selection");
        return BulkEditOutcome {
            rows: rows.to_vec(),
            formatting: formatting.clone(),
            selection: selection.with_bulk_edit_mode(false),
            cells_written: 0,
        };
    };

    let formatted = match config.format_value {
        Some(format) => format(value),
        None => value.clone(),
    };

    let target_ids: Vec<&RowId> = selection
        .selected_cells()
        .iter()
        .filter(|c| c.field == target)
        .map(|c| &c.row_id)
        .collect();

    let mut cells_written = 0;
    let new_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            if target_ids.contains(&&row.id) {
                cells_written += 1;
                row.with_value(&target, formatted.clone())
            } else {
                row.clone()
            }
        })
        .collect();

    let new_formatting = match &config.formatting {
        Some(patch) => {
            let raw_value = match &config.data_type {
                Some(data_type) if data_type.is_numeric() => {
                    CellValue::Number(lenient_number_of(&formatted))
                }
                _ => formatted.clone(),
            };
            let entry = FormattingEntry {
                raw_value: Some(raw_value),
                ..patch.clone()
            };
            formatting.merge_many(
                target_ids
                    .iter()
                    .map(|id| (CellKey::new((*id).clone(), &target), entry.clone())),
            )
        }
        None => formatting.clone(),
    };

    let updates: Vec<(RowId, String, CellValue)> = target_ids
        .iter()
        .map(|id| ((*id).clone(), target.clone(), formatted.clone()))
        .collect();
    let new_selection = selection.with_cell_values(&updates).with_bulk_edit_mode(false);

    log::debug!(
        "bulk edit wrote {} cell(s) in '{}' ({} selected)",
        cells_written,
        target,
        target_ids.len()
    );

    BulkEditOutcome {
        rows: new_rows,
        formatting: new_formatting,
        selection: new_selection,
        cells_written,
    }
}

/// Stock value formatter rendering a number as `$1,234.50`.
pub fn format_currency(value: &CellValue) -> CellValue {
    let n = lenient_number_of(value);
    let cents = (n.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u64;
    let frac = (cents % 100.0) as u64;
    let sign = if n < 0.0 && cents > 0.0 { "-" } else { "" };
    CellValue::Text(format!("{}${}.{:02}", sign, group_thousands(whole), frac))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectedCell;
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<Row> {
        vec![
            Row::new(1u64).with("name", "John").with("price", 10.0),
            Row::new(2u64).with("name", "Jane").with("price", 20.0),
            Row::new(3u64).with("name", "Jim").with("price", 30.0),
        ]
    }

    fn select(cells: &[(u64, &str)]) -> SelectionState {
        let rows = rows();
        cells.iter().fold(SelectionState::default(), |state, (id, field)| {
            let row = rows.iter().find(|r| r.id == RowId::from(*id)).unwrap();
            state.select_cell(SelectedCell::from_row(row, field), true)
        })
    }

    #[test]
    fn test_target_requires_multiple_same_field_cells() {
        assert_eq!(bulk_edit_target(&select(&[(1, "name")]), None), None);
        assert_eq!(bulk_edit_target(&select(&[(1, "name"), (2, "price")]), None), None);
        assert_eq!(
            bulk_edit_target(&select(&[(1, "name"), (2, "name")]), None),
            Some("name".to_string())
        );
        assert_eq!(bulk_edit_target(&SelectionState::default(), None), None);
    }

    #[test]
    fn test_target_with_field_filter() {
        let state = select(&[(1, "name"), (2, "name"), (3, "price")]);
        assert_eq!(bulk_edit_target(&state, None), None);
        assert_eq!(bulk_edit_target(&state, Some("name")), Some("name".to_string()));
        assert_eq!(bulk_edit_target(&state, Some("price")), None);
        assert!(!can_bulk_edit(&state, Some("other")));
    }

    #[test]
    fn test_apply_overwrites_values_and_exits_mode() {
        let state = begin_bulk_edit(&select(&[(1, "name"), (2, "name")]), None);
        assert!(state.is_bulk_edit_mode());
        let out = apply_bulk_edit(
            &rows(),
            &state,
            &FormattingStore::new(),
            None,
            &CellValue::text("New Name"),
            &BulkEditConfig::default(),
        );
        assert_eq!(out.cells_written, 2);
        assert_eq!(out.rows[0].get("name"), Some(&CellValue::text("New Name")));
        assert_eq!(out.rows[1].get("name"), Some(&CellValue::text("New Name")));
        assert_eq!(out.rows[2].get("name"), Some(&CellValue::text("Jim")));
        assert!(!out.selection.is_bulk_edit_mode());
        assert!(out.formatting.is_empty());
        assert!(out
            .selection
            .selected_cells()
            .iter()
            .all(|c| c.value == CellValue::text("New Name")));
    }

    #[test]
    fn test_not_offered_is_noop_but_exits_mode() {
        let state = select(&[(1, "name"), (2, "price")]).with_bulk_edit_mode(true);
        let formatting = FormattingStore::new();
        let out = apply_bulk_edit(
            &rows(),
            &state,
            &formatting,
            None,
            &CellValue::text("x"),
            &BulkEditConfig::default(),
        );
        assert_eq!(out.cells_written, 0);
        assert_eq!(out.rows, rows());
        assert!(out.formatting.ptr_eq(&formatting));
        assert!(!out.selection.is_bulk_edit_mode());
    }

    #[test]
    fn test_formatting_caches_numeric_raw_value() {
        let state = select(&[(1, "price"), (3, "price")]);
        let out = apply_bulk_edit(
            &rows(),
            &state,
            &FormattingStore::new(),
            Some("price"),
            &CellValue::text("1234.5"),
            &BulkEditConfig {
                format_value: Some(&format_currency),
                formatting: Some(FormattingEntry::fill("yellow")),
                data_type: Some(DataType::Currency),
            },
        );
        assert_eq!(out.rows[0].get("price"), Some(&CellValue::text("$1,234.50")));
        let entry = out.formatting.get(&CellKey::new(3u64, "price")).unwrap();
        assert_eq!(entry.fill_color.as_deref(), Some("yellow"));
        assert_eq!(entry.raw_value, Some(CellValue::Number(1234.5)));
        assert!(out.formatting.get(&CellKey::new(2u64, "price")).is_none());
        assert_eq!(out.selection.numeric_cell_values(), &[] as &[f64]);
    }

    #[test]
    fn test_formatting_raw_value_for_text_columns() {
        let state = select(&[(1, "name"), (2, "name")]);
        let existing = FormattingStore::new().merge_update(
            CellKey::new(1u64, "name"),
            &FormattingEntry {
                bold: Some(true),
                ..Default::default()
            },
        );
        let out = apply_bulk_edit(
            &rows(),
            &state,
            &existing,
            None,
            &CellValue::text("abc"),
            &BulkEditConfig {
                formatting: Some(FormattingEntry::text("red")),
                ..Default::default()
            },
        );
        let entry = out.formatting.get(&CellKey::new(1u64, "name")).unwrap();
        assert_eq!(entry.bold, Some(true));
        assert_eq!(entry.text_color.as_deref(), Some("red"));
        assert_eq!(entry.raw_value, Some(CellValue::text("abc")));
    }

    #[test]
    fn test_unparsable_numeric_raw_value_is_zero() {
        let state = select(&[(1, "price"), (2, "price")]);
        let out = apply_bulk_edit(
            &rows(),
            &state,
            &FormattingStore::new(),
            None,
            &CellValue::text("n/a"),
            &BulkEditConfig {
                formatting: Some(FormattingEntry::default()),
                data_type: Some(DataType::Number),
                ..Default::default()
            },
        );
        let entry = out.formatting.get(&CellKey::new(2u64, "price")).unwrap();
        assert_eq!(entry.raw_value, Some(CellValue::Number(0.0)));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(&CellValue::Number(0.0)), CellValue::text("$0.00"));
        assert_eq!(format_currency(&CellValue::Number(-1234567.891)), CellValue::text("-$1,234,567.89"));
        assert_eq!(format_currency(&CellValue::text("$999.999")), CellValue::text("$1,000.00"));
    }
}
