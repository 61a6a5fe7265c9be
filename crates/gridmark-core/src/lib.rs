//! gridmark-core - UI-agnostic grid interaction state: selection, bulk edit,
//! layout and the session that ties them to a row snapshot.

pub mod bulk_edit;
pub mod columns;
pub mod config;
pub mod error;
pub mod layout;
pub mod selection;
pub mod session;

pub use bulk_edit::{BulkEditConfig, BulkEditOutcome, apply_bulk_edit, begin_bulk_edit, format_currency};
pub use columns::ColumnSet;
pub use config::{GridConfig, LayoutConfig, SelectionConfig};
pub use error::{GridError, Result};
pub use layout::{CharCountMeasurer, ColumnWidths, LayoutCalculator, RowHeight, TextMeasurer, WrapConfig};
pub use selection::{SelectedCell, SelectionState, SelectionStats};
pub use session::{GridSession, RowSource, Snapshot};

pub use gridmark_engine::engine::{CellKey, CellValue, FormattingEntry, FormattingStore, Row, RowId};
