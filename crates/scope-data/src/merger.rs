//! Combines several parsed sources into one chronologically ordered table.

use chrono::NaiveDateTime;
use scope_core::data_processors::TimestampProcessor;
use scope_core::error::{Result, ScopeError};
use scope_core::models::{is_timestamp_column, TIMESTAMP_COLUMN};
use tracing::debug;

use crate::sources::SourceTable;
use crate::table::RawTable;

/// How the column set of a merged table is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeSchema {
    /// Every column of every non-empty source, in first-seen order.
    #[default]
    Union,
    /// Only the columns of the first non-empty source.
    FirstSource,
}

impl MergeSchema {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "union" => Some(MergeSchema::Union),
            "first-source" | "first_source" => Some(MergeSchema::FirstSource),
            _ => None,
        }
    }
}

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub table: RawTable,
    /// Non-empty sources that contributed rows.
    pub sources_used: usize,
    /// Rows excluded because their timestamp did not parse.
    pub rows_dropped: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableMerger {
    schema: MergeSchema,
}

impl TableMerger {
    pub fn new(schema: MergeSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> MergeSchema {
        self.schema
    }

    /// Merge `sources` into one table sorted ascending by timestamp.
    ///
    /// Sources without rows are ignored. Rows are imported by column name,
    /// and rows whose timestamp cannot be parsed are dropped. Equal
    /// timestamps keep their input order.
    ///
    /// # Errors
    ///
    /// * [`ScopeError::MissingTimestampColumn`] when the merged column set
    ///   has no timestamp column.
    /// * [`ScopeError::NoValidData`] when no row survives.
    pub fn merge(&self, sources: &[SourceTable]) -> Result<MergeOutcome> {
        let non_empty: Vec<&SourceTable> = sources.iter().filter(|s| !s.table.is_empty()).collect();
        if non_empty.is_empty() {
            return Err(ScopeError::NoValidData {
                sources: sources.len(),
            });
        }

        let mut merged = RawTable::default();
        let contributing = match self.schema {
            MergeSchema::Union => non_empty.len(),
            MergeSchema::FirstSource => 1,
        };
        for source in &non_empty[..contributing] {
            declare_columns(&mut merged, &source.table);
        }

        let ts_idx = merged
            .timestamp_index()
            .ok_or_else(|| ScopeError::MissingTimestampColumn(TIMESTAMP_COLUMN.to_string()))?;

        let width = merged.columns().len();
        let mut pooled: Vec<(NaiveDateTime, Vec<Option<String>>)> = Vec::new();
        let mut rows_dropped = 0usize;

        for source in &non_empty {
            let mapping = column_mapping(&merged, &source.table);
            let before = pooled.len();

            for row in source.table.rows() {
                let mut cells: Vec<Option<String>> = vec![None; width];
                for (src_idx, cell) in row.iter().enumerate() {
                    if let Some(dst_idx) = mapping[src_idx] {
                        cells[dst_idx] = cell.clone();
                    }
                }

                match cells[ts_idx].as_deref().and_then(TimestampProcessor::parse) {
                    Some(ts) => pooled.push((ts, cells)),
                    None => rows_dropped += 1,
                }
            }

            debug!(
                "Merged {}: {} of {} rows kept",
                source.path.display(),
                pooled.len() - before,
                source.table.row_count(),
            );
        }

        if pooled.is_empty() {
            return Err(ScopeError::NoValidData {
                sources: non_empty.len(),
            });
        }

        // Stable: ties keep source order, then row order.
        pooled.sort_by_key(|(ts, _)| *ts);

        for (_, cells) in pooled {
            merged.push_row(cells);
        }

        Ok(MergeOutcome {
            table: merged,
            sources_used: non_empty.len(),
            rows_dropped,
        })
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Add the columns of `source` to `merged`, folding every spelling of the
/// timestamp column onto the first one seen.
fn declare_columns(merged: &mut RawTable, source: &RawTable) {
    for (idx, name) in source.columns().iter().enumerate() {
        let unit = source.unit(idx).map(str::to_string);
        if is_timestamp_column(name) {
            if merged.timestamp_index().is_none() {
                merged.add_column(name.clone(), unit);
            }
        } else {
            merged.add_column(name.clone(), unit);
        }
    }
}

/// For each column of `source`, its position in `merged` (if kept).
fn column_mapping(merged: &RawTable, source: &RawTable) -> Vec<Option<usize>> {
    source
        .columns()
        .iter()
        .map(|name| {
            if is_timestamp_column(name) {
                merged.timestamp_index()
            } else {
                merged.column_index(name)
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
