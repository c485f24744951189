use indexmap::IndexSet;
use serde_json::Value;

use super::unique_headers;
use crate::error::AppError;
use crate::models::RawTable;

/// Parses an array of flat JSON objects into a table.
///
/// Columns appear in first-seen key order across all records. Keys missing
/// from a record and `null` values become empty cells.
pub fn parse_json(data: &[u8]) -> Result<RawTable, AppError> {
    let value: Value = serde_json::from_slice(data)?;

    let records = match value {
        Value::Array(records) => records,
        _ => {
            return Err(AppError::ParseError(
                "JSON upload must be an array of objects".to_string(),
            ))
        }
    };

    if records.is_empty() {
        return Err(AppError::ParseError("JSON upload contains no records".to_string()));
    }

    let mut keys: IndexSet<String> = IndexSet::new();
    let mut objects = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(map) => {
                keys.extend(map.keys().cloned());
                objects.push(map);
            }
            other => {
                return Err(AppError::ParseError(format!(
                    "JSON record {} is not an object: {}",
                    index + 1,
                    other
                )))
            }
        }
    }

    if keys.is_empty() {
        return Err(AppError::ParseError("JSON records have no fields".to_string()));
    }

    let rows = objects
        .iter()
        .map(|object| {
            keys.iter()
                .map(|key| object.get(key).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable::new(unique_headers(keys.iter()), rows))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
