//! Newline-delimited JSON logs, one sample record per line:
//!
//! ```json
//! {"timestamp": "2024-01-01 00:00:00", "values": [{"key": "voltage", "value": 230.1, "unit": "V"}]}
//! ```
//!
//! The first non-blank record fixes the column set for the whole file.

use std::path::Path;

use scope_core::data_processors::ValueNormalizer;
use scope_core::error::{Result, ScopeError};
use scope_core::models::{is_timestamp_column, TIMESTAMP_COLUMN};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::table::RawTable;

#[derive(Debug, Deserialize)]
struct LogRecord {
    #[serde(default)]
    timestamp: Option<Value>,
    values: Vec<LogValue>,
}

#[derive(Debug, Deserialize)]
struct LogValue {
    key: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    unit: Option<String>,
}

/// Parse NDJSON `content` read from `path`.
///
/// Any malformed line aborts the whole parse with a [`ScopeError::RecordParse`]
/// naming its 1-based line number. A `null` or missing value is stored as
/// `0`; keys not present in the first record are dropped, and keys of the
/// first record missing from a later one leave that cell absent.
pub fn parse_structured(path: &Path, content: &str) -> Result<RawTable> {
    let mut table: Option<RawTable> = None;
    let mut keys_dropped = 0usize;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line_no = i + 1;

        let record: LogRecord = serde_json::from_str(trimmed)
            .map_err(|e| parse_error(path, line_no, e.to_string()))?;

        let table = table.get_or_insert_with(|| schema_from(&record));
        let mut cells: Vec<Option<String>> = vec![None; table.columns().len()];

        if let Some(ts_idx) = table.timestamp_index() {
            cells[ts_idx] = timestamp_text(record.timestamp.as_ref())
                .map_err(|msg| parse_error(path, line_no, msg))?;
        }

        for entry in &record.values {
            let text = value_text(entry).map_err(|msg| parse_error(path, line_no, msg))?;
            match table.column_index(&entry.key) {
                Some(idx) if !is_timestamp_column(&entry.key) => cells[idx] = Some(text),
                _ => keys_dropped += 1,
            }
        }

        table.push_row(cells);
    }

    let table = table.unwrap_or_default();
    debug!(
        "File {}: {} records parsed, {} values outside the first-record schema",
        path.display(),
        table.row_count(),
        keys_dropped,
    );
    Ok(table)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// `timestamp` plus each distinct key of the first record, in order.
fn schema_from(record: &LogRecord) -> RawTable {
    let mut table = RawTable::with_columns([TIMESTAMP_COLUMN]);
    for entry in &record.values {
        if is_timestamp_column(&entry.key) {
            continue;
        }
        table.add_column(entry.key.clone(), entry.unit.clone());
    }
    table
}

fn timestamp_text(raw: Option<&Value>) -> std::result::Result<Option<String>, String> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(format!("timestamp must be a string, found {}", other)),
    }
}

/// Text stored for one `{key, value}` entry.
fn value_text(entry: &LogValue) -> std::result::Result<String, String> {
    match &entry.value {
        None | Some(Value::Null) => Ok(0.0_f64.to_string()),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|v| v.to_string())
            .ok_or_else(|| format!("value of '{}' is out of range", entry.key)),
        Some(Value::String(s)) => ValueNormalizer::parse(s)
            .map(|v| v.to_string())
            .ok_or_else(|| format!("value of '{}' is not numeric: \"{}\"", entry.key, s)),
        Some(other) => Err(format!("value of '{}' is not numeric: {}", entry.key, other)),
    }
}

fn parse_error(path: &Path, line: usize, message: String) -> ScopeError {
    ScopeError::RecordParse {
        path: path.to_path_buf(),
        line,
        message,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
