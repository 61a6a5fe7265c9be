//! Selection model.
//!
//! Tracks selected cells and selected rows, and derives the numeric subset
//! of the selected cell values for downstream statistics.
//!
//! Every operation takes `&self` and returns a new [`SelectionState`], so a
//! gesture is observed as a single replacement and the derived numeric
//! values are always recomputed before the caller sees the new state.

use gridmark_engine::engine::{CellValue, Row, RowId};

use crate::config::DEFAULT_ROW_SELECTOR_FIELD;

/// A selected cell together with the value it held when selected.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedCell {
    pub row_id: RowId,
    pub field: String,
    pub value: CellValue,
}

impl SelectedCell {
    pub fn new(row_id: impl Into<RowId>, field: &str, value: impl Into<CellValue>) -> SelectedCell {
        SelectedCell {
            row_id: row_id.into(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Select `field` of `row`; a missing field selects a null value.
    pub fn from_row(row: &Row, field: &str) -> SelectedCell {
        SelectedCell {
            row_id: row.id.clone(),
            field: field.to_string(),
            value: row.get(field).cloned().unwrap_or_default(),
        }
    }

    pub fn same_cell(&self, row_id: &RowId, field: &str) -> bool {
        &self.row_id == row_id && self.field == field
    }
}

/// Summary statistics over the numeric selected values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionStats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Selected cells, selected rows and the derived numeric values.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionState {
    selected_cells: Vec<SelectedCell>,
    selected_rows: Vec<Row>,
    numeric_cell_values: Vec<f64>,
    bulk_edit_mode: bool,
    row_selector_field: String,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::new(DEFAULT_ROW_SELECTOR_FIELD)
    }
}

impl SelectionState {
    pub fn new(row_selector_field: &str) -> SelectionState {
        SelectionState {
            selected_cells: Vec::new(),
            selected_rows: Vec::new(),
            numeric_cell_values: Vec::new(),
            bulk_edit_mode: false,
            row_selector_field: row_selector_field.to_string(),
        }
    }

    /// Selected cells, in selection order.
    pub fn selected_cells(&self) -> &[SelectedCell] {
        &self.selected_cells
    }

    pub fn selected_rows(&self) -> &[Row] {
        &self.selected_rows
    }

    pub fn numeric_cell_values(&self) -> &[f64] {
        &self.numeric_cell_values
    }

    pub fn is_bulk_edit_mode(&self) -> bool {
        self.bulk_edit_mode
    }

    pub fn row_selector_field(&self) -> &str {
        &self.row_selector_field
    }

    pub fn contains(&self, row_id: &RowId, field: &str) -> bool {
        self.selected_cells.iter().any(|c| c.same_cell(row_id, field))
    }

    pub fn is_row_selected(&self, row_id: &RowId) -> bool {
        self.selected_rows.iter().any(|r| &r.id == row_id)
    }

    /// Select a cell.
    ///
    /// Non-additive selection replaces the whole cell selection. Additive
    /// selection toggles the cell: an already-selected `(row, field)` is
    /// removed, anything else is appended. Cells of the row-selector
    /// column are ignored.
    pub fn select_cell(&self, cell: SelectedCell, additive: bool) -> SelectionState {
        if cell.field == self.row_selector_field {
            log::trace!("ignoring selection of row selector cell on row {}", cell.row_id);
            return self.clone();
        }
        let mut cells = if additive {
            self.selected_cells.clone()
        } else {
            Vec::new()
        };
        match cells
            .iter()
            .position(|c| c.same_cell(&cell.row_id, &cell.field))
        {
            Some(idx) => {
                cells.remove(idx);
            }
            None => cells.push(cell),
        }
        log::debug!("cell selection now has {} cell(s)", cells.len());
        self.with_cells(cells)
    }

    /// Replace the row selection with exactly the rows of `all_rows` whose
    /// id is in `ids`, in snapshot order.
    pub fn select_rows(&self, ids: &[RowId], all_rows: &[Row]) -> SelectionState {
        let rows: Vec<Row> = all_rows
            .iter()
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect();
        log::debug!("row selection now has {} row(s)", rows.len());
        self.with_rows(rows)
    }

    pub fn select_all_rows(&self, all_rows: &[Row]) -> SelectionState {
        self.with_rows(all_rows.to_vec())
    }

    pub fn clear_cells(&self) -> SelectionState {
        self.with_cells(Vec::new())
    }

    pub fn clear_rows(&self) -> SelectionState {
        self.with_rows(Vec::new())
    }

    /// Store numeric values directly, bypassing derivation. The next
    /// selection change recomputes them from the selected cells.
    pub fn store_numeric_values(&self, values: Vec<f64>) -> SelectionState {
        SelectionState {
            numeric_cell_values: values,
            ..self.clone()
        }
    }

    /// Count, sum, average, min and max of the numeric values.
    pub fn stats(&self) -> Option<SelectionStats> {
        let values = &self.numeric_cell_values;
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(SelectionStats {
            count: values.len(),
            sum,
            average: sum / values.len() as f64,
            min,
            max,
        })
    }

    pub(crate) fn with_bulk_edit_mode(&self, on: bool) -> SelectionState {
        SelectionState {
            bulk_edit_mode: on,
            ..self.clone()
        }
    }

    /// Overwrite the stored value of every selected cell matching one of
    /// `updates`; numeric values are recomputed.
    pub(crate) fn with_cell_values(&self, updates: &[(RowId, String, CellValue)]) -> SelectionState {
        let cells = self
            .selected_cells
            .iter()
            .map(|cell| {
                updates
                    .iter()
                    .find(|(row_id, field, _)| cell.same_cell(row_id, field))
                    .map(|(_, _, value)| SelectedCell {
                        value: value.clone(),
                        ..cell.clone()
                    })
                    .unwrap_or_else(|| cell.clone())
            })
            .collect();
        self.with_cells(cells)
    }

    /// Re-resolve the selection against a new snapshot: rows are replaced
    /// by their new versions (or dropped), cells of vanished rows dropped.
    pub(crate) fn rebased(&self, all_rows: &[Row]) -> SelectionState {
        let ids: Vec<RowId> = self.selected_rows.iter().map(|r| r.id.clone()).collect();
        let cells: Vec<SelectedCell> = self
            .selected_cells
            .iter()
            .filter(|cell| all_rows.iter().any(|row| row.id == cell.row_id))
            .cloned()
            .collect();
        self.select_rows(&ids, all_rows).with_cells(cells)
    }

    fn with_cells(&self, cells: Vec<SelectedCell>) -> SelectionState {
        SelectionState {
            numeric_cell_values: derive_numeric_values(&cells),
            selected_cells: cells,
            ..self.clone()
        }
    }

    fn with_rows(&self, rows: Vec<Row>) -> SelectionState {
        SelectionState {
            selected_rows: rows,
            numeric_cell_values: derive_numeric_values(&self.selected_cells),
            ..self.clone()
        }
    }
}

/// Numeric, non-zero values of `cells`, in selection order.
pub fn derive_numeric_values(cells: &[SelectedCell]) -> Vec<f64> {
    cells
        .iter()
        .filter_map(|cell| cell.value.coerce_number())
        .filter(|n| *n != 0.0)
        .collect()
}
