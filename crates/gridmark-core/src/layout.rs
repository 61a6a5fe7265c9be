//! Layout calculator: row heights and auto-fit column widths.
//!
//! Text is measured through a [`TextMeasurer`] when the host has a real
//! rendering surface. Without one, or when measuring fails, widths fall
//! back to `chars * fallback_char_width`, so every calculation here works
//! without a rendering environment.

use std::collections::HashMap;
use std::sync::Arc;

use gridmark_engine::engine::{Row, RowId};

use crate::config::LayoutConfig;

/// Measures rendered text width.
pub trait TextMeasurer {
    /// Width of `text` in `font`, or None if it cannot be measured.
    fn measure(&self, text: &str, font: &str) -> Option<f64>;
}

/// Pure fallback measurer: character count times a constant width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharCountMeasurer {
    pub char_width: f64,
}

impl TextMeasurer for CharCountMeasurer {
    fn measure(&self, text: &str, _font: &str) -> Option<f64> {
        Some(text.chars().count() as f64 * self.char_width)
    }
}

/// Height of a rendered row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RowHeight {
    Fixed(f64),
    /// The rendering layer sizes the row to its content.
    Auto,
}

impl RowHeight {
    pub fn is_auto(&self) -> bool {
        matches!(self, RowHeight::Auto)
    }
}

/// Pixel width per field. Created lazily by the first resize; every
/// update returns a new value.
#[derive(Clone, Debug, Default)]
pub struct ColumnWidths {
    widths: Arc<HashMap<String, f64>>,
}

impl ColumnWidths {
    pub fn new() -> ColumnWidths {
        ColumnWidths::default()
    }

    pub fn width_of(&self, field: &str) -> Option<f64> {
        self.widths.get(field).copied()
    }

    pub fn width_or_default(&self, field: &str, config: &LayoutConfig) -> f64 {
        self.width_of(field).unwrap_or(config.default_column_width)
    }

    pub fn with_width(&self, field: &str, width: f64) -> ColumnWidths {
        let mut widths = (*self.widths).clone();
        widths.insert(field.to_string(), width);
        ColumnWidths {
            widths: Arc::new(widths),
        }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn ptr_eq(&self, other: &ColumnWidths) -> bool {
        Arc::ptr_eq(&self.widths, &other.widths)
    }
}

/// Host-facing key of a wrap entry: `"{rowId}|{field}"`.
pub fn wrap_key(row_id: &RowId, field: &str) -> String {
    format!("{}|{}", row_id, field)
}

/// Per-cell wrap flags.
#[derive(Clone, Debug, Default)]
pub struct WrapConfig {
    entries: Arc<HashMap<String, bool>>,
}

impl WrapConfig {
    pub fn new() -> WrapConfig {
        WrapConfig::default()
    }

    /// Build from `"{rowId}|{field}"` keys. The row id ends at the first `|`.
    pub fn from_keys<'k>(entries: impl IntoIterator<Item = (&'k str, bool)>) -> WrapConfig {
        let map = entries
            .into_iter()
            .filter(|(key, _)| key.contains('|'))
            .map(|(key, on)| (key.to_string(), on))
            .collect();
        WrapConfig {
            entries: Arc::new(map),
        }
    }

    pub fn is_wrapped(&self, row_id: &RowId, field: &str) -> bool {
        self.entries
            .get(&wrap_key(row_id, field))
            .copied()
            .unwrap_or(false)
    }

    pub fn with(&self, row_id: &RowId, field: &str, on: bool) -> WrapConfig {
        let mut entries = (*self.entries).clone();
        entries.insert(wrap_key(row_id, field), on);
        WrapConfig {
            entries: Arc::new(entries),
        }
    }

    pub fn toggled(&self, row_id: &RowId, field: &str) -> WrapConfig {
        self.with(row_id, field, !self.is_wrapped(row_id, field))
    }

    pub fn ptr_eq(&self, other: &WrapConfig) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

/// Computes row heights and column widths from measured text.
#[derive(Clone, Copy)]
pub struct LayoutCalculator<'a> {
    config: &'a LayoutConfig,
    measurer: Option<&'a dyn TextMeasurer>,
}

impl<'a> LayoutCalculator<'a> {
    /// A calculator that always uses the character-count fallback.
    pub fn new(config: &'a LayoutConfig) -> LayoutCalculator<'a> {
        LayoutCalculator {
            config,
            measurer: None,
        }
    }

    pub fn with_measurer(config: &'a LayoutConfig, measurer: &'a dyn TextMeasurer) -> LayoutCalculator<'a> {
        LayoutCalculator {
            config,
            measurer: Some(measurer),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    /// Width of `text` in the configured font. Never fails.
    pub fn measure_text(&self, text: &str) -> f64 {
        if let Some(measurer) = self.measurer {
            match measurer.measure(text, &self.config.font) {
                Some(width) if width.is_finite() && width >= 0.0 => return width,
                other => {
                    log::debug!(
                        "text measurement failed ({:?}); using character-count fallback",
                        other
                    );
                }
            }
        }
        CharCountMeasurer {
            char_width: self.config.fallback_char_width,
        }
        .measure(text, &self.config.font)
        .unwrap_or(0.0)
    }

    /// Height of `row`: auto as soon as one wrapped text/number field is
    /// wider than its column, otherwise the fixed default height.
    pub fn row_height(&self, row: &Row, wrap: &WrapConfig, widths: &ColumnWidths) -> RowHeight {
        for (field, value) in row.fields() {
            if !wrap.is_wrapped(&row.id, field) || !value.is_wrappable() {
                continue;
            }
            let text_width = self.measure_text(&value.display_text());
            let column_width = widths.width_or_default(field, self.config);
            if text_width > column_width {
                log::trace!(
                    "row {} grows: '{}' needs {:.1}px of {:.1}px",
                    row.id,
                    field,
                    text_width,
                    column_width
                );
                return RowHeight::Auto;
            }
        }
        RowHeight::Fixed(self.config.default_row_height)
    }

    pub fn row_heights(&self, rows: &[Row], wrap: &WrapConfig, widths: &ColumnWidths) -> Vec<RowHeight> {
        rows.iter()
            .map(|row| self.row_height(row, wrap, widths))
            .collect()
    }

    /// Width that fits the header and every visible cell of `field`, plus
    /// padding, floored at the minimum column width.
    pub fn auto_fit_width(&self, header: &str, field: &str, visible_rows: &[Row]) -> f64 {
        let widest = visible_rows
            .iter()
            .filter_map(|row| row.get(field))
            .map(|value| self.measure_text(&value.display_text()))
            .fold(self.measure_text(header), f64::max);
        (widest + self.config.auto_fit_padding).max(self.config.min_column_width)
    }

    /// Auto-fit `field` and return the updated widths.
    pub fn auto_fit(
        &self,
        widths: &ColumnWidths,
        header: &str,
        field: &str,
        visible_rows: &[Row],
    ) -> ColumnWidths {
        let width = self.auto_fit_width(header, field, visible_rows);
        log::debug!("auto-fit '{}' to {:.1}px", field, width);
        widths.with_width(field, width)
    }

    /// Manual resize, floored at the minimum column width.
    pub fn resize(&self, widths: &ColumnWidths, field: &str, width: f64) -> ColumnWidths {
        let width = if width.is_finite() {
            width.max(self.config.min_column_width)
        } else {
            self.config.min_column_width
        };
        widths.with_width(field, width)
    }
}
