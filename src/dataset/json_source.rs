//! JSON reader for the results table.
//!
//! Accepts an array of objects keyed by the same column names as the CSV
//! header. Numeric margins are kept in their textual form so they go
//! through the same coercion as CSV cells.

use super::{DatasetError, Result};
use crate::models::{RawRecord, REQUIRED_COLUMNS};
use indicatif::ProgressBar;
use serde_json::{Map, Value};
use std::io::Read;

/// Read an array of result objects.
pub fn read_json<R: Read>(reader: R, progress: Option<&ProgressBar>) -> Result<Vec<RawRecord>> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(DatasetError::NotAnArray);
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let row = index + 1;
        let object = item.as_object().ok_or(DatasetError::NotAnObject { row })?;
        rows.push(record_from_object(object, row)?);
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(rows)
}

fn record_from_object(object: &Map<String, Value>, row: usize) -> Result<RawRecord> {
    // report the first absent column in schema order
    if let Some(column) = REQUIRED_COLUMNS.iter().find(|c| !object.contains_key(**c)) {
        return Err(DatasetError::MissingField {
            row,
            field: column.to_string(),
        });
    }

    let cell = |column: &str| object.get(column).map(cell_text).unwrap_or_default();

    Ok(RawRecord {
        constituency: cell("Constituency"),
        leading_candidate: cell("Leading Candidate"),
        leading_party: cell("Leading Party"),
        trailing_party: cell("Trailing Party"),
        margin: cell("Margin"),
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
