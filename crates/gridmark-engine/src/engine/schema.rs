//! Column schema and per-column configuration supplied by the host.

use serde::{Deserialize, Serialize};

/// Declared data type of a column. Unknown names are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Other(String),
}

impl DataType {
    pub fn parse(name: &str) -> DataType {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "string" => DataType::Text,
            "number" | "numeric" | "integer" | "float" => DataType::Number,
            "currency" | "money" => DataType::Currency,
            "date" | "datetime" => DataType::Date,
            other => DataType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Currency => "currency",
            DataType::Date => "date",
            DataType::Other(name) => name,
        }
    }

    /// True for types whose cached raw value is stored numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Number | DataType::Currency)
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        DataType::parse(&s)
    }
}

impl From<DataType> for String {
    fn from(t: DataType) -> Self {
        t.as_str().to_string()
    }
}

/// One entry of the column schema. `alias_name` is the field key used
/// everywhere else in the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub column_name: String,
    pub alias_name: String,
    #[serde(default)]
    pub data_type: Option<DataType>,
}

impl ColumnSchema {
    pub fn new(column_name: &str, alias_name: &str) -> ColumnSchema {
        ColumnSchema {
            column_name: column_name.to_string(),
            alias_name: alias_name.to_string(),
            data_type: None,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> ColumnSchema {
        self.data_type = Some(data_type);
        self
    }
}

/// Editor kind of a configured column.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    /// Fixed dropdown of allowed values.
    Select { options: Vec<String> },
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Currency => "currency",
            ColumnKind::Date => "date",
            ColumnKind::Select { .. } => "select",
        }
    }
}

/// Optional per-column configuration. Unconfigured columns are
/// non-editable generic text; a missing or unknown `type` is text too.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ColumnConfigWire", into = "ColumnConfigWire")]
pub struct ColumnConfig {
    pub kind: ColumnKind,
    pub is_editable: bool,
}

/// Wire shape of [`ColumnConfig`]: `{ type?, options?, isEditable? }`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnConfigWire {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    #[serde(default)]
    is_editable: bool,
}

impl From<ColumnConfigWire> for ColumnConfig {
    fn from(wire: ColumnConfigWire) -> Self {
        let kind = match wire.kind.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("number") => ColumnKind::Number,
            Some("currency") => ColumnKind::Currency,
            Some("date") => ColumnKind::Date,
            Some("select") => ColumnKind::Select {
                options: wire.options,
            },
            _ => ColumnKind::Text,
        };
        ColumnConfig {
            kind,
            is_editable: wire.is_editable,
        }
    }
}

impl From<ColumnConfig> for ColumnConfigWire {
    fn from(config: ColumnConfig) -> Self {
        let kind = Some(config.kind.as_str().to_string());
        let options = match config.kind {
            ColumnKind::Select { options } => options,
            _ => Vec::new(),
        };
        ColumnConfigWire {
            kind,
            options,
            is_editable: config.is_editable,
        }
    }
}
