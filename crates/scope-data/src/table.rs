//! Fixed-schema in-memory table shared by the source parsers and the merger.

use std::collections::HashMap;

use scope_core::models::{is_timestamp_column, Measurement};

/// Raw text cells keyed by column, in first-seen column order.
///
/// Every row holds exactly one cell per declared column; a cell is `None`
/// when the source did not provide a value for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    units: Vec<Option<String>>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create an empty table with the given column names.
    ///
    /// Names are assumed unique; a repeated name keeps its first position.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for name in columns {
            table.add_column(name, None);
        }
        table
    }

    /// Return the index of `name`, appending it first when it is new.
    ///
    /// Existing rows are widened with absent cells. A unit given for a
    /// column that has none yet is recorded.
    pub fn add_column(&mut self, name: impl Into<String>, unit: Option<String>) -> usize {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            if self.units[idx].is_none() {
                self.units[idx] = unit;
            }
            return idx;
        }

        let idx = self.columns.len();
        self.index.insert(name.clone(), idx);
        self.columns.push(name);
        self.units.push(unit);
        for row in &mut self.rows {
            row.push(None);
        }
        idx
    }

    /// Append a row. Returns `false` (and leaves the table untouched) when
    /// the cell count does not match the column count.
    pub fn push_row(&mut self, cells: Vec<Option<String>>) -> bool {
        if cells.len() != self.columns.len() {
            return false;
        }
        self.rows.push(cells);
        true
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact (case-sensitive) lookup of a column position.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Position of the timestamp column, matched case-insensitively.
    pub fn timestamp_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| is_timestamp_column(c))
    }

    pub fn unit(&self, idx: usize) -> Option<&str> {
        self.units.get(idx).and_then(|u| u.as_deref())
    }

    /// Raw cell text, `None` when out of range or absent.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Non-timestamp column names in declaration order.
    pub fn measurement_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !is_timestamp_column(c))
            .map(String::as_str)
            .collect()
    }

    /// Fresh, unselected [`Measurement`]s for every non-timestamp column.
    pub fn measurements(&self) -> Vec<Measurement> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !is_timestamp_column(c))
            .map(|(i, c)| Measurement::new(c.clone(), self.units[i].clone()))
            .collect()
    }
}
