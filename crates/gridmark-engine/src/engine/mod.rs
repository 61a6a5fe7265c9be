//! Grid engine API.
//!
//! This module provides the data model and ordering machinery of the grid:
//!
//! - [`CellValue`], [`Row`], [`RowId`] - Row snapshot model
//! - [`ColumnSchema`], [`ColumnConfig`] - Host-supplied column description
//! - [`FormattingStore`] - Merge-only per-cell formatting
//! - [`preprocess_rows`] - Project formatting into synthetic sort keys
//! - [`make_comparator`] - Type-aware row comparators
//! - [`SortModel`], [`apply_multi_column_sort`] - Multi-column sorting

mod compare;
mod formatting;
mod projection;
mod row;
mod schema;
mod sort;
mod value;

pub use compare::{
    RowComparator, SortDirection, SortType, epoch_millis, locale_cmp, make_comparator,
};
pub use formatting::{CellKey, FormattingEntry, FormattingStore};
pub use projection::{SortKeyTable, SyntheticKind, preprocess_rows, synthetic_field};
pub use row::{Row, RowId};
pub use schema::{ColumnConfig, ColumnKind, ColumnSchema, DataType};
pub use sort::{SortLevel, SortModel, apply_multi_column_sort};
pub use value::{CellValue, lenient_number_of, parse_lenient_number};
