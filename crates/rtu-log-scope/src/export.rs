//! JSON export of the current dataset view.

use serde::Serialize;

use scope_core::models::{Measurement, Series, StatisticsRecord};
use scope_runtime::pipeline::LogScope;

/// Serialisable snapshot of a [`LogScope`].
#[derive(Debug, Serialize)]
pub struct ScopeExport<'a> {
    pub sources: Vec<String>,
    pub rows: usize,
    pub measurements: &'a [Measurement],
    pub series: &'a [Series],
    pub statistics: &'a [StatisticsRecord],
}

impl<'a> ScopeExport<'a> {
    pub fn from_scope(scope: &'a LogScope) -> Self {
        Self {
            sources: scope
                .sources()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            rows: scope.table().row_count(),
            measurements: scope.measurements(),
            series: scope.series(),
            statistics: scope.statistics(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_contains_selected_series_and_statistics() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("day.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"timestamp":"2024-01-01 00:00:00","values":[{"key":"v","value":230,"unit":"V"}]}"#,
                "\n",
                r#"{"timestamp":"2024-01-01 00:00:01","values":[{"key":"v","value":232,"unit":"V"}]}"#,
                "\n"
            ),
        )
        .unwrap();

        let mut scope = LogScope::new();
        scope.load_single(&path).unwrap();
        scope.select_all(true);

        let json: serde_json::Value =
            serde_json::from_str(&ScopeExport::from_scope(&scope).to_json().unwrap()).unwrap();

        assert_eq!(json["rows"], 2);
        assert_eq!(json["measurements"][0]["unit"], "V");
        assert_eq!(json["series"][0]["name"], "v");
        assert_eq!(json["series"][0]["points"].as_array().unwrap().len(), 2);
        assert_eq!(json["statistics"][0]["max"], 232.0);
        assert!(json["sources"][0].as_str().unwrap().ends_with("day.jsonl"));
    }

    #[test]
    fn test_export_empty_scope() {
        let scope = LogScope::new();
        let json: serde_json::Value =
            serde_json::from_str(&ScopeExport::from_scope(&scope).to_json().unwrap()).unwrap();
        assert_eq!(json["rows"], 0);
        assert!(json["series"].as_array().unwrap().is_empty());
    }
}
