//! The log scope facade: owns the loaded table, the measurement selection
//! and the derived series/statistics view.
//!
//! Loads are built off to the side and swapped in only on success, so a
//! failed load leaves the previous dataset, selection and view untouched.
//! Every selection change recomputes the view from the raw table.

use std::path::{Path, PathBuf};

use scope_core::error::{ReportedError, Result, ScopeError};
use scope_core::formatting::format_statistics_summary;
use scope_core::models::{Measurement, Series, StatisticsRecord};
use scope_data::aggregator::{DatasetView, SeriesAggregator};
use scope_data::merger::{MergeSchema, TableMerger};
use scope_data::sources::{load_source, SourceFormat, SourceTable};
use scope_data::table::RawTable;

// ── LoadSummary ───────────────────────────────────────────────────────────────

/// A source that `load_multiple` could not use.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: ReportedError,
}

/// What a successful load produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub rows: usize,
    pub measurements: usize,
    pub sources_used: usize,
    pub skipped: Vec<SkippedSource>,
    /// Rows excluded by the merge because their timestamp did not parse.
    pub rows_dropped: usize,
}

// ── LogScope ──────────────────────────────────────────────────────────────────

/// Pipeline facade over one dataset.
///
/// # Example
/// ```no_run
/// use scope_runtime::pipeline::LogScope;
///
/// let mut scope = LogScope::new();
/// scope.load_single("2024-01-01.csv".as_ref()).unwrap();
/// scope.set_selected("voltage", true);
/// println!("{}", scope.statistics_summary());
/// ```
#[derive(Debug, Default)]
pub struct LogScope {
    /// Forced source format; `None` detects per file.
    format: Option<SourceFormat>,
    merger: TableMerger,
    table: RawTable,
    measurements: Vec<Measurement>,
    view: DatasetView,
    sources: Vec<PathBuf>,
    /// Sources the current dataset was loaded without.
    skipped: Vec<SkippedSource>,
    loaded: bool,
    last_error: Option<ReportedError>,
}

impl LogScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: Option<SourceFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_schema(mut self, schema: MergeSchema) -> Self {
        self.merger = TableMerger::new(schema);
        self
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Load one source as-is: no sorting and no timestamp filtering.
    ///
    /// A source without a timestamp column loads but offers no measurements.
    pub fn load_single(&mut self, path: &Path) -> Result<LoadSummary> {
        let source = match load_source(path, self.format) {
            Ok(source) => source,
            Err(e) => return Err(self.report(e)),
        };

        if source.table.timestamp_index().is_none() {
            tracing::warn!(
                path = %path.display(),
                "source has no timestamp column; nothing to plot"
            );
        }

        let summary = LoadSummary {
            rows: source.table.row_count(),
            sources_used: 1,
            ..LoadSummary::default()
        };
        Ok(self.install(source.table, vec![source.path], summary))
    }

    /// Load several sources and merge them into one time-ordered table.
    ///
    /// Sources that cannot be read or parsed are skipped and listed in the
    /// summary. When none can be loaded the first failure is returned.
    pub fn load_multiple(&mut self, paths: &[PathBuf]) -> Result<LoadSummary> {
        if paths.is_empty() {
            return Err(self.report(ScopeError::Config("no sources given".to_string())));
        }

        let mut loaded: Vec<SourceTable> = Vec::with_capacity(paths.len());
        let mut skipped: Vec<SkippedSource> = Vec::new();
        let mut first_error: Option<ScopeError> = None;

        for path in paths {
            match load_source(path, self.format) {
                Ok(source) => loaded.push(source),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping source");
                    skipped.push(SkippedSource {
                        path: path.clone(),
                        reason: ReportedError::from(&e),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }

        if loaded.is_empty() {
            let err = first_error.unwrap_or(ScopeError::NoValidData {
                sources: paths.len(),
            });
            return Err(self.report(err));
        }

        let outcome = match self.merger.merge(&loaded) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.report(e)),
        };

        let summary = LoadSummary {
            rows: outcome.table.row_count(),
            sources_used: outcome.sources_used,
            skipped,
            rows_dropped: outcome.rows_dropped,
            ..LoadSummary::default()
        };
        let sources = loaded.into_iter().map(|s| s.path).collect();
        Ok(self.install(outcome.table, sources, summary))
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Select or deselect `name` and recompute. Returns `false` when no such
    /// measurement exists.
    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        let Some(m) = self.measurement_mut(name) else {
            return false;
        };
        m.selected = selected;
        self.recompute();
        true
    }

    /// Flip the selection of `name`, returning the new state.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let m = self.measurement_mut(name)?;
        m.selected = !m.selected;
        let now = m.selected;
        self.recompute();
        Some(now)
    }

    /// Apply many selection changes with a single recompute. Unknown names
    /// are ignored; returns how many changes matched a measurement.
    pub fn set_selection<I, S>(&mut self, changes: I) -> usize
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut applied = 0;
        for (name, selected) in changes {
            if let Some(m) = self.measurement_mut(name.as_ref()) {
                m.selected = selected;
                applied += 1;
            }
        }
        self.recompute();
        applied
    }

    /// Select or deselect every measurement.
    pub fn select_all(&mut self, selected: bool) {
        for m in &mut self.measurements {
            m.selected = selected;
        }
        self.recompute();
    }

    /// Rebuild series and statistics from the raw table.
    pub fn recompute(&mut self) {
        self.view = SeriesAggregator::aggregate(&self.table, &self.measurements);
        tracing::debug!(
            series = self.view.series.len(),
            statistics = self.view.statistics.len(),
            "view recomputed"
        );
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn series(&self) -> &[Series] {
        &self.view.series
    }

    pub fn series_for(&self, name: &str) -> Option<&Series> {
        self.view.series.iter().find(|s| s.name == name)
    }

    pub fn statistics(&self) -> &[StatisticsRecord] {
        &self.view.statistics
    }

    /// One `"{name}: Min = .. | Max = .. | Avg = .."` line per record.
    pub fn statistics_summary(&self) -> String {
        format_statistics_summary(&self.view.statistics)
    }

    pub fn view(&self) -> &DatasetView {
        &self.view
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn table(&self) -> &RawTable {
        &self.table
    }

    /// Paths of the sources behind the current dataset.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Sources left out of the current dataset, with their failures.
    pub fn skipped_sources(&self) -> &[SkippedSource] {
        &self.skipped
    }

    /// The last escalated failure, cleared by the next successful load.
    pub fn last_error(&self) -> Option<&ReportedError> {
        self.last_error.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn measurement_mut(&mut self, name: &str) -> Option<&mut Measurement> {
        self.measurements.iter_mut().find(|m| m.name == name)
    }

    /// Swap in a freshly loaded table with a new, unselected measurement set.
    fn install(
        &mut self,
        table: RawTable,
        sources: Vec<PathBuf>,
        mut summary: LoadSummary,
    ) -> LoadSummary {
        self.measurements = if table.timestamp_index().is_some() {
            table.measurements()
        } else {
            Vec::new()
        };
        self.table = table;
        self.sources = sources;
        self.skipped = summary.skipped.clone();
        self.loaded = true;
        self.last_error = None;
        self.recompute();

        summary.measurements = self.measurements.len();
        tracing::info!(
            rows = summary.rows,
            measurements = summary.measurements,
            sources = summary.sources_used,
            skipped = summary.skipped.len(),
            "dataset loaded"
        );
        summary
    }

    fn report(&mut self, err: ScopeError) -> ScopeError {
        tracing::warn!(error = %err, "load failed; keeping previous dataset");
        self.last_error = Some(ReportedError::from(&err));
        err
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
