//! Grid session: the state a host keeps between gestures.
//!
//! Each gesture method replaces the pieces of state it touches with new
//! values; nothing is mutated in place, so a host comparing handles
//! (`ptr_eq`) sees exactly what changed. The session never holds sorted
//! rows: [`GridSession::view`] re-runs projection and sort every call.

use std::collections::HashSet;

use gridmark_engine::engine::{
    CellKey, CellValue, FormattingEntry, FormattingStore, Row, RowId, SortModel,
    apply_multi_column_sort, preprocess_rows,
};

use crate::bulk_edit::{self, BulkEditConfig};
use crate::columns::ColumnSet;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::layout::{ColumnWidths, LayoutCalculator, RowHeight, TextMeasurer, WrapConfig};
use crate::selection::{SelectedCell, SelectionState};

/// A row snapshot delivered by a refresh, with an optional new auth token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub token: Option<String>,
}

/// Host-supplied source of fresh table data.
pub trait RowSource {
    fn fetch(&mut self, token: Option<&str>) -> Result<Snapshot>;
}

pub struct GridSession {
    config: GridConfig,
    columns: ColumnSet,
    rows: Vec<Row>,
    formatting: FormattingStore,
    sort: SortModel,
    selection: SelectionState,
    widths: ColumnWidths,
    wrap: WrapConfig,
    token: Option<String>,
}

impl GridSession {
    pub fn new(config: GridConfig, columns: ColumnSet) -> GridSession {
        let selection = SelectionState::new(&config.selection.row_selector_field);
        GridSession {
            config,
            columns,
            rows: Vec::new(),
            formatting: FormattingStore::new(),
            sort: SortModel::new(),
            selection,
            widths: ColumnWidths::new(),
            wrap: WrapConfig::new(),
            token: None,
        }
    }

    /// Replace the column set, e.g. once a schema is known.
    pub fn set_columns(&mut self, columns: ColumnSet) {
        self.columns = columns;
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Rows in snapshot (unsorted) order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn formatting(&self) -> &FormattingStore {
        &self.formatting
    }

    pub fn sort_model(&self) -> &SortModel {
        &self.sort
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn column_widths(&self) -> &ColumnWidths {
        &self.widths
    }

    pub fn wrap_config(&self) -> &WrapConfig {
        &self.wrap
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replace the row snapshot. Rejects snapshots with duplicate row ids
    /// and leaves the session untouched in that case.
    pub fn accept_snapshot(&mut self, snapshot: Snapshot) -> Result<()> {
        if let Some(dup) = first_duplicate_id(&snapshot.rows) {
            return Err(GridError::InvalidSnapshot(format!(
                "duplicate row id '{}'",
                dup
            )));
        }
        self.selection = self.selection.rebased(&snapshot.rows);
        self.rows = snapshot.rows;
        if snapshot.token.is_some() {
            self.token = snapshot.token;
        }
        log::debug!("accepted snapshot of {} rows", self.rows.len());
        Ok(())
    }

    /// Fetch a new snapshot from `source` and accept it. On failure the
    /// session keeps its current state.
    pub fn refresh(&mut self, source: &mut dyn RowSource) -> Result<()> {
        match source.fetch(self.token.as_deref()) {
            Ok(snapshot) => self.accept_snapshot(snapshot),
            Err(err) => {
                log::warn!("refresh failed: {}", err);
                Err(err)
            }
        }
    }

    /// Rows projected and sorted by the current sort model.
    pub fn view(&self) -> Vec<Row> {
        let keys = preprocess_rows(&self.rows, &self.formatting);
        apply_multi_column_sort(&self.rows, self.sort.levels(), &keys)
    }

    pub fn set_sort_model(&mut self, model: SortModel) {
        self.sort = model;
    }

    pub fn sort_ascending(&mut self, field: &str) {
        self.sort = self
            .sort
            .sort_ascending(field, self.columns.sort_type_for(field));
    }

    pub fn sort_descending(&mut self, field: &str) {
        self.sort = self
            .sort
            .sort_descending(field, self.columns.sort_type_for(field));
    }

    pub fn clear_sort(&mut self, field: &str) {
        self.sort = self.sort.cleared(field);
    }

    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = self.sort.toggle(field, self.columns.sort_type_for(field));
    }

    /// Select the cell at `(row_id, field)` with its current value.
    pub fn select_cell(&mut self, row_id: &RowId, field: &str, additive: bool) {
        let cell = match self.rows.iter().find(|r| &r.id == row_id) {
            Some(row) => SelectedCell::from_row(row, field),
            None => SelectedCell::new(row_id.clone(), field, CellValue::Null),
        };
        self.selection = self.selection.select_cell(cell, additive);
    }

    pub fn select_rows(&mut self, ids: &[RowId]) {
        self.selection = self.selection.select_rows(ids, &self.rows);
    }

    pub fn select_all_rows(&mut self) {
        self.selection = self.selection.select_all_rows(&self.rows);
    }

    pub fn apply_formatting(&mut self, key: CellKey, patch: &FormattingEntry) {
        self.formatting = self.formatting.merge_update(key, patch);
    }

    /// Merge every entry of `store` into the session's formatting.
    pub fn merge_formatting(&mut self, store: &FormattingStore) {
        self.formatting = self
            .formatting
            .merge_many(store.iter().map(|(k, e)| (k.clone(), e.clone())));
    }

    pub fn begin_bulk_edit(&mut self, field: Option<&str>) {
        self.selection = bulk_edit::begin_bulk_edit(&self.selection, field);
    }

    /// Bulk-edit the selected cells of `field` (or of the whole selection).
    /// When the config has no data type, the column's declared type is used.
    /// Returns the number of cells written.
    pub fn bulk_edit(&mut self, field: Option<&str>, value: &CellValue, config: &BulkEditConfig<'_>) -> usize {
        let data_type = config.data_type.clone().or_else(|| {
            bulk_edit::bulk_edit_target(&self.selection, field).map(|f| self.columns.data_type(&f))
        });
        let config = BulkEditConfig {
            format_value: config.format_value,
            formatting: config.formatting.clone(),
            data_type,
        };
        let outcome = bulk_edit::apply_bulk_edit(
            &self.rows,
            &self.selection,
            &self.formatting,
            field,
            value,
            &config,
        );
        self.rows = outcome.rows;
        self.formatting = outcome.formatting;
        self.selection = outcome.selection;
        outcome.cells_written
    }

    pub fn selectable_values(&self, field: &str) -> Vec<String> {
        self.columns.selectable_values(field, &self.rows)
    }

    pub fn toggle_wrap(&mut self, row_id: &RowId, field: &str) {
        self.wrap = self.wrap.toggled(row_id, field);
    }

    pub fn set_wrap(&mut self, row_id: &RowId, field: &str, on: bool) {
        self.wrap = self.wrap.with(row_id, field, on);
    }

    pub fn resize_column(&mut self, field: &str, width: f64) {
        self.widths = self.calculator(None).resize(&self.widths, field, width);
    }

    /// Auto-fit `field` against the currently visible (sorted) rows.
    pub fn auto_fit_column(&mut self, field: &str, measurer: Option<&dyn TextMeasurer>) {
        let visible = self.view();
        let header = self.columns.header(field).to_string();
        self.widths = self
            .calculator(measurer)
            .auto_fit(&self.widths, &header, field, &visible);
    }

    pub fn column_width(&self, field: &str) -> f64 {
        self.widths.width_or_default(field, &self.config.layout)
    }

    pub fn row_height(&self, row: &Row, measurer: Option<&dyn TextMeasurer>) -> RowHeight {
        self.calculator(measurer)
            .row_height(row, &self.wrap, &self.widths)
    }

    fn calculator<'a>(&'a self, measurer: Option<&'a dyn TextMeasurer>) -> LayoutCalculator<'a> {
        match measurer {
            Some(m) => LayoutCalculator::with_measurer(&self.config.layout, m),
            None => LayoutCalculator::new(&self.config.layout),
        }
    }
}

fn first_duplicate_id(rows: &[Row]) -> Option<RowId> {
    let mut seen = HashSet::new();
    rows.iter()
        .find(|r| !seen.insert(&r.id))
        .map(|r| r.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmark_engine::engine::{ColumnSchema, DataType, SortDirection, SortType};
    use pretty_assertions::assert_eq;

    struct StaticSource {
        snapshot: Option<Snapshot>,
        seen_token: Option<String>,
    }

    impl RowSource for StaticSource {
        fn fetch(&mut self, token: Option<&str>) -> Result<Snapshot> {
            self.seen_token = token.map(str::to_string);
            self.snapshot
                .take()
                .ok_or_else(|| GridError::Refresh("backend unavailable".to_string()))
        }
    }

    fn session() -> GridSession {
        let columns = ColumnSet::new(vec![
            ColumnSchema::new("Name", "name"),
            ColumnSchema::new("Age", "age").with_type(DataType::Number),
        ]);
        let mut session = GridSession::new(GridConfig::default(), columns);
        session
            .accept_snapshot(Snapshot {
                rows: vec![
                    Row::new(1u64).with("name", "John").with("age", "30"),
                    Row::new(2u64).with("name", "Jane").with("age", 4.0),
                    Row::new(3u64).with("name", "Jim").with("age", 25.0),
                ],
                token: Some("t0".to_string()),
            })
            .unwrap();
        session
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_header_sort_uses_column_type() {
        let mut s = session();
        s.sort_ascending("age");
        assert_eq!(s.sort_model().levels()[0].sort_type, SortType::Numeric);
        assert_eq!(ids(&s.view()), vec!["2", "3", "1"]);
        s.toggle_sort("age");
        assert_eq!(s.sort_model().levels()[0].direction, SortDirection::Desc);
        assert_eq!(ids(&s.view()), vec!["1", "3", "2"]);
        s.clear_sort("age");
        assert_eq!(ids(&s.view()), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_color_sort_follows_formatting_changes() {
        let mut s = session();
        s.set_sort_model(SortModel::new().sort_descending("name", SortType::FillColor));
        assert_eq!(ids(&s.view()), vec!["1", "2", "3"]);
        s.apply_formatting(CellKey::new(3u64, "name"), &FormattingEntry::fill("red"));
        assert_eq!(ids(&s.view()), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_select_cell_captures_current_value() {
        let mut s = session();
        s.select_cell(&RowId::from(1u64), "age", false);
        s.select_cell(&RowId::from(3u64), "age", true);
        assert_eq!(s.selection().numeric_cell_values(), &[30.0, 25.0]);
    }

    #[test]
    fn test_bulk_edit_uses_column_type_for_raw_value() {
        let mut s = session();
        s.select_cell(&RowId::from(1u64), "age", false);
        s.select_cell(&RowId::from(2u64), "age", true);
        s.begin_bulk_edit(Some("age"));
        assert!(s.selection().is_bulk_edit_mode());
        let written = s.bulk_edit(
            Some("age"),
            &CellValue::text("40 yrs"),
            &BulkEditConfig {
                formatting: Some(FormattingEntry::fill("green")),
                ..Default::default()
            },
        );
        assert_eq!(written, 2);
        assert!(!s.selection().is_bulk_edit_mode());
        let entry = s.formatting().get(&CellKey::new(2u64, "age")).unwrap();
        assert_eq!(entry.raw_value, Some(CellValue::Number(40.0)));
        assert_eq!(s.rows()[1].get("age"), Some(&CellValue::text("40 yrs")));
    }

    #[test]
    fn test_refresh_replaces_rows_and_token() {
        let mut s = session();
        s.select_rows(&[RowId::from(1u64), RowId::from(2u64)]);
        let mut source = StaticSource {
            snapshot: Some(Snapshot {
                rows: vec![Row::new(2u64).with("name", "Jane").with("age", 5.0)],
                token: Some("t1".to_string()),
            }),
            seen_token: None,
        };
        s.refresh(&mut source).unwrap();
        assert_eq!(source.seen_token.as_deref(), Some("t0"));
        assert_eq!(s.token(), Some("t1"));
        assert_eq!(ids(s.selection().selected_rows()), vec!["2"]);

        // A failing source leaves everything as it was.
        let err = s.refresh(&mut source).unwrap_err();
        assert!(matches!(err, GridError::Refresh(_)));
        assert_eq!(s.rows().len(), 1);
        assert_eq!(s.token(), Some("t1"));
    }

    #[test]
    fn test_snapshot_without_token_keeps_old_token() {
        let mut s = session();
        s.accept_snapshot(Snapshot {
            rows: vec![],
            token: None,
        })
        .unwrap();
        assert_eq!(s.token(), Some("t0"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut s = session();
        let err = s
            .accept_snapshot(Snapshot {
                rows: vec![Row::new(9u64), Row::new(9u64)],
                token: None,
            })
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidSnapshot(_)));
        assert_eq!(s.rows().len(), 3);
    }

    #[test]
    fn test_auto_fit_and_row_height() {
        let mut s = session();
        s.auto_fit_column("name", None);
        // 4 chars at 8px plus 24px padding
        assert_eq!(s.column_width("name"), 56.0);
        s.set_wrap(&RowId::from(1u64), "name", true);
        s.resize_column("name", 10.0);
        let row = s.rows()[0].clone();
        assert_eq!(s.row_height(&row, None), RowHeight::Fixed(24.0));
        s.set_wrap(&RowId::from(1u64), "name", false);
        s.toggle_wrap(&RowId::from(1u64), "name");
        let long = row.with_value("name", CellValue::text("Johnathan Jacobson"));
        assert_eq!(s.row_height(&long, None), RowHeight::Auto);
    }
}
