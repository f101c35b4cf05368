//! Comma-separated log files: one header line, then one sample per line.

use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use scope_core::error::{Result, ScopeError};
use tracing::debug;

use crate::table::RawTable;

/// Parse comma-separated `content` read from `path`.
///
/// * The first line is the header, even when blank.
/// * Header names are trimmed; unnamed columns become `Column1`, `Column2`,
///   and so on, skipping names the header already uses.
/// * A header naming the same column twice is rejected.
/// * Rows whose field count differs from the header are dropped.
/// * Cell text is kept verbatim, normalization happens later.
///
/// An empty input yields an empty table; a header-only input yields a table
/// with columns and no rows.
pub fn parse_delimited(path: &Path, content: &str) -> Result<RawTable> {
    if content.is_empty() {
        return Ok(RawTable::default());
    }

    // The csv reader drops empty lines, so the header line is split off here.
    let (header, body) = content.split_once('\n').unwrap_or((content, ""));
    let mut table = build_header(path, header.strip_suffix('\r').unwrap_or(header))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(body.as_bytes());

    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| record_error(path, &e))?;
        if is_blank(&record) {
            continue;
        }

        rows_read += 1;
        let cells = record.iter().map(|f| Some(f.to_string())).collect();
        if !table.push_row(cells) {
            rows_dropped += 1;
        }
    }

    debug!(
        "File {}: {} rows read, {} dropped for field count",
        path.display(),
        rows_read,
        rows_dropped,
    );

    Ok(table)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn build_header(path: &Path, line: &str) -> Result<RawTable> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names: Vec<String> = Vec::new();
    let mut next_default = 1usize;

    for field in line.split(',') {
        let trimmed = field.trim();
        let name = if trimmed.is_empty() {
            loop {
                let candidate = format!("Column{}", next_default);
                next_default += 1;
                if !seen.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            trimmed.to_string()
        };
        if !seen.insert(name.clone()) {
            return Err(ScopeError::DuplicateColumn {
                path: path.to_path_buf(),
                column: name,
            });
        }
        names.push(name);
    }

    Ok(RawTable::with_columns(names))
}

/// A whitespace-only line arrives as a single blank field.
fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

fn record_error(path: &Path, err: &csv::Error) -> ScopeError {
    ScopeError::RecordParse {
        path: path.to_path_buf(),
        // Positions count from the line after the header.
        line: err.position().map(|p| p.line() as usize + 1).unwrap_or(0),
        message: err.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
