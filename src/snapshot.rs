//! JSON decoding of row snapshots, formatting maps and column schemas.

use gridmark_core::{GridError, RowSource, Snapshot};
use gridmark_engine::engine::{CellKey, CellValue, ColumnSchema, FormattingEntry, FormattingStore, Row, RowId};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Convert one JSON value into a cell value.
pub fn cell_value_from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Number(n) => CellValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Bool(b) => CellValue::Text(b.to_string()),
        Value::Object(map) => CellValue::Labeled {
            value: map.get("value").and_then(scalar_text),
            label: map.get("label").and_then(scalar_text),
        },
        Value::Array(_) => CellValue::Text(value.to_string()),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn row_id_from_json(value: &Value) -> Option<RowId> {
    match value {
        Value::String(s) => Some(RowId::from(s.as_str())),
        Value::Number(n) => Some(match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => RowId::from(u),
            (None, Some(i)) => RowId::from(i),
            _ => RowId::new(n.to_string()),
        }),
        _ => None,
    }
}

fn row_from_json(index: usize, object: &Map<String, Value>) -> gridmark_core::Result<Row> {
    let id = object
        .get("id")
        .and_then(row_id_from_json)
        .ok_or_else(|| GridError::InvalidSnapshot(format!("row {} has no usable id", index)))?;
    let row = object
        .iter()
        .filter(|(field, _)| field.as_str() != "id")
        .fold(Row::new(id), |row, (field, value)| {
            row.with(field, cell_value_from_json(value))
        });
    Ok(row)
}

/// Decode a snapshot: either a bare array of rows or
/// `{ "rows": [...], "token": "..." }`.
pub fn snapshot_from_json(value: &Value) -> gridmark_core::Result<Snapshot> {
    let (rows, token) = match value {
        Value::Array(rows) => (rows, None),
        Value::Object(map) => {
            let Some(Value::Array(rows)) = map.get("rows") else {
                return Err(GridError::InvalidSnapshot(
                    "expected an array of rows or an object with a \"rows\" array".to_string(),
                ));
            };
            (rows, map.get("token").and_then(Value::as_str).map(str::to_string))
        }
        _ => {
            return Err(GridError::InvalidSnapshot(
                "expected an array of rows".to_string(),
            ));
        }
    };

    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(object) => row_from_json(i, object),
            _ => Err(GridError::InvalidSnapshot(format!("row {} is not an object", i))),
        })
        .collect::<gridmark_core::Result<Vec<Row>>>()?;
    Ok(Snapshot { rows, token })
}

/// Decode a `{"rowId:field": {...}}` formatting map. Keys without a `:`
/// are skipped with a warning.
pub fn formatting_from_json(value: &Value) -> Result<FormattingStore> {
    let Value::Object(map) = value else {
        return Err(AppError::Argument(
            "formatting must be a JSON object keyed by \"rowId:field\"".to_string(),
        ));
    };
    let mut entries = Vec::with_capacity(map.len());
    for (key, entry) in map {
        let Some(cell) = CellKey::parse(key) else {
            log::warn!("skipping formatting key '{}': expected rowId:field", key);
            continue;
        };
        let entry: FormattingEntry = serde_json::from_value(entry.clone())?;
        entries.push((cell, entry));
    }
    Ok(entries.into_iter().collect())
}

pub fn schema_from_json(value: &Value) -> Result<Vec<ColumnSchema>> {
    Ok(serde_json::from_value(value.clone())?)
}

/// Schema for rows that come without one: every field in order of first
/// appearance, named after itself.
pub fn infer_schema(rows: &[Row]) -> Vec<ColumnSchema> {
    let mut schema: Vec<ColumnSchema> = Vec::new();
    for row in rows {
        for field in row.field_names() {
            if !schema.iter().any(|c| c.alias_name == field) {
                schema.push(ColumnSchema::new(field, field));
            }
        }
    }
    schema
}

pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Row source backed by a JSON file, re-read on every fetch.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> FileSource {
        FileSource { path }
    }
}

impl RowSource for FileSource {
    fn fetch(&mut self, token: Option<&str>) -> gridmark_core::Result<Snapshot> {
        log::debug!(
            "reading rows from {} (token: {})",
            self.path.display(),
            if token.is_some() { "set" } else { "none" }
        );
        let content = std::fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&content).map_err(|err| GridError::Parse {
            line: err.line(),
            message: err.to_string(),
        })?;
        snapshot_from_json(&value)
    }
}
