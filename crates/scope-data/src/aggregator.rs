//! Series extraction and min/max/average statistics over selected columns.

use scope_core::data_processors::{TimestampProcessor, ValueNormalizer};
use scope_core::models::{Measurement, Point, Series, StatisticsRecord};
use serde::Serialize;

use crate::table::RawTable;

// ── AggregatedStats ───────────────────────────────────────────────────────────

/// Running min/max/sum over normalized values of one column.
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: usize,
}

impl AggregatedStats {
    /// Fold one value into the running totals.
    pub fn add_value(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// `None` when no value was added.
    pub fn into_record(self, name: impl Into<String>) -> Option<StatisticsRecord> {
        let average = self.average()?;
        Some(StatisticsRecord {
            name: name.into(),
            min: self.min,
            max: self.max,
            average,
            count: self.count,
        })
    }
}

// ── DatasetView ───────────────────────────────────────────────────────────────

/// Everything derived from a table and a selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetView {
    /// One entry per selected column present in the table, in declaration order.
    pub series: Vec<Series>,
    /// Selected columns with at least one numeric value.
    pub statistics: Vec<StatisticsRecord>,
}

// ── SeriesAggregator ──────────────────────────────────────────────────────────

/// Stateless; every call re-normalizes the raw cells of the table.
pub struct SeriesAggregator;

impl SeriesAggregator {
    /// Build series and statistics for every selected measurement.
    ///
    /// Selected names missing from the table are ignored. A table without a
    /// timestamp column produces statistics but no series.
    pub fn aggregate(table: &RawTable, measurements: &[Measurement]) -> DatasetView {
        let mut view = DatasetView::default();

        for measurement in measurements.iter().filter(|m| m.selected) {
            let Some(col) = table.column_index(&measurement.name) else {
                continue;
            };

            if let Some(series) = Self::build_series(table, col, &measurement.name) {
                view.series.push(series);
            }
            if let Some(record) = Self::compute_statistics(table, col, &measurement.name) {
                view.statistics.push(record);
            }
        }

        view
    }

    /// Points for rows where both the timestamp and the value normalize.
    pub fn build_series(table: &RawTable, col: usize, name: &str) -> Option<Series> {
        let ts_idx = table.timestamp_index()?;
        let mut series = Series::new(name);

        for row in table.rows() {
            let time = row[ts_idx].as_deref().and_then(TimestampProcessor::parse);
            let value = row[col].as_deref().and_then(ValueNormalizer::parse);
            if let (Some(time), Some(value)) = (time, value) {
                series.points.push(Point { time, value });
            }
        }

        Some(series)
    }

    /// Statistics over every value of the column that normalizes.
    pub fn compute_statistics(table: &RawTable, col: usize, name: &str) -> Option<StatisticsRecord> {
        let mut stats = AggregatedStats::default();
        table
            .rows()
            .iter()
            .filter_map(|row| row[col].as_deref().and_then(ValueNormalizer::parse))
            .for_each(|v| stats.add_value(v));
        stats.into_record(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
