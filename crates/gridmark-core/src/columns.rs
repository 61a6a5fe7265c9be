//! Column schema + configuration lookups.

use std::collections::HashMap;

use gridmark_engine::engine::{
    ColumnConfig, ColumnKind, ColumnSchema, DataType, Row, SortType, locale_cmp,
};

/// The grid's columns: ordered schema plus optional per-column config,
/// both keyed by alias name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnSet {
    schema: Vec<ColumnSchema>,
    config: HashMap<String, ColumnConfig>,
}

impl ColumnSet {
    pub fn new(schema: Vec<ColumnSchema>) -> ColumnSet {
        ColumnSet {
            schema,
            config: HashMap::new(),
        }
    }

    pub fn with_config(mut self, field: &str, config: ColumnConfig) -> ColumnSet {
        self.config.insert(field.to_string(), config);
        self
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    /// Field keys in display order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|c| c.alias_name.as_str())
    }

    pub fn column(&self, field: &str) -> Option<&ColumnSchema> {
        self.schema.iter().find(|c| c.alias_name == field)
    }

    /// Header text: the column name, or the field itself if unknown.
    pub fn header<'a>(&'a self, field: &'a str) -> &'a str {
        self.column(field)
            .map(|c| c.column_name.as_str())
            .unwrap_or(field)
    }

    pub fn data_type(&self, field: &str) -> DataType {
        self.column(field)
            .and_then(|c| c.data_type.clone())
            .unwrap_or_default()
    }

    /// Default comparator for header-driven sorting of `field`.
    pub fn sort_type_for(&self, field: &str) -> SortType {
        match self.data_type(field) {
            DataType::Number | DataType::Currency => SortType::Numeric,
            DataType::Date => SortType::Date,
            DataType::Text | DataType::Other(_) => SortType::Alphanumeric,
        }
    }

    pub fn is_editable(&self, field: &str) -> bool {
        self.config.get(field).is_some_and(|c| c.is_editable)
    }

    pub fn kind(&self, field: &str) -> ColumnKind {
        self.config
            .get(field)
            .map(|c| c.kind.clone())
            .unwrap_or_default()
    }

    /// Values offered when editing `field`: the fixed options of a select
    /// column, otherwise the distinct non-empty texts present in `rows`.
    pub fn selectable_values(&self, field: &str, rows: &[Row]) -> Vec<String> {
        if let ColumnKind::Select { options } = self.kind(field) {
            return options;
        }
        let mut values: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get(field))
            .map(|value| value.display_text())
            .filter(|text| !text.is_empty())
            .collect();
        values.sort_by(|a, b| locale_cmp(a, b));
        values.dedup();
        values
    }
}
