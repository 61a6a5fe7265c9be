//! Grid configuration.
//!
//! Every field has a default so a partial (or missing) config file still
//! yields a usable grid.

use serde::Deserialize;

/// Reserved field name of the row-checkbox pseudo-column.
pub const DEFAULT_ROW_SELECTOR_FIELD: &str = "__check__";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub layout: LayoutConfig,
    pub selection: SelectionConfig,
}

/// Constants of the layout calculator, in pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub default_row_height: f64,
    /// Width assumed for columns that were never resized.
    pub default_column_width: f64,
    pub min_column_width: f64,
    pub auto_fit_padding: f64,
    /// Per-character width used when no text measurer is available.
    pub fallback_char_width: f64,
    pub font: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_row_height: 24.0,
            default_column_width: 150.0,
            min_column_width: 50.0,
            auto_fit_padding: 24.0,
            fallback_char_width: 8.0,
            font: "14px sans-serif".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    pub row_selector_field: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            row_selector_field: DEFAULT_ROW_SELECTOR_FIELD.to_string(),
        }
    }
}
