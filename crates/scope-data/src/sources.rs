//! Source discovery, format detection and loading.

use std::path::{Path, PathBuf};

use scope_core::error::{Result, ScopeError};
use tracing::{debug, warn};

use crate::delimited::parse_delimited;
use crate::structured::parse_structured;
use crate::table::RawTable;

const DELIMITED_EXTENSIONS: &[&str] = &["csv", "txt"];
const STRUCTURED_EXTENSIONS: &[&str] = &["json", "jsonl", "ndjson", "log"];

/// Extensions picked up when walking a directory. Narrower than detection:
/// the logger's `error.log` sits next to the data files.
const DATA_EXTENSIONS: &[&str] = &["csv", "json", "jsonl", "ndjson"];

/// Directory holding the logger's own settings, never measurement data.
const CONFIG_DIR: &str = "config";

// ── SourceFormat ──────────────────────────────────────────────────────────────

/// On-disk layout of a log source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated text with a header line.
    Delimited,
    /// One JSON record per line.
    Structured,
}

impl SourceFormat {
    /// Map a user-facing format name. `"auto"` and unknown names yield `None`
    /// so the format is detected per file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "csv" | "delimited" => Some(SourceFormat::Delimited),
            "jsonl" | "ndjson" | "json" | "structured" => Some(SourceFormat::Structured),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceFormat::Delimited)
        } else if STRUCTURED_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceFormat::Structured)
        } else {
            None
        }
    }

    /// Content sniffing: a first non-blank character of `{` means structured.
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') => SourceFormat::Structured,
            _ => SourceFormat::Delimited,
        }
    }

    /// Extension first, content second.
    pub fn detect(path: &Path, content: &str) -> Self {
        Self::from_extension(path).unwrap_or_else(|| Self::sniff(content))
    }
}

// ── SourceTable ───────────────────────────────────────────────────────────────

/// A parsed source together with the file it came from.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    pub table: RawTable,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read a whole source file into memory, dropping a leading UTF-8 BOM.
pub fn read_source(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ScopeError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Read and parse one source. `forced` overrides format detection.
pub fn load_source(path: &Path, forced: Option<SourceFormat>) -> Result<SourceTable> {
    let content = read_source(path)?;
    let format = forced.unwrap_or_else(|| SourceFormat::detect(path, &content));
    debug!("Parsing {} as {:?}", path.display(), format);

    let table = match format {
        SourceFormat::Delimited => parse_delimited(path, &content)?,
        SourceFormat::Structured => parse_structured(path, &content)?,
    };

    Ok(SourceTable {
        path: path.to_path_buf(),
        table,
    })
}

fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DATA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Find measurement files recursively under `dir`, sorted by path.
///
/// `config/` subdirectories are not entered.
pub fn find_log_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir() && entry.file_name() == CONFIG_DIR)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_data_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand directories into the log files beneath them; plain paths are
/// kept as given so that a missing file still surfaces as a read error.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut expanded = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_dir() {
            let found = find_log_files(path);
            if found.is_empty() {
                warn!("No log files found in {}", path.display());
            }
            expanded.extend(found);
        } else {
            expanded.push(path.clone());
        }
    }
    expanded
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use scope_core::error::ErrorKind;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── Format detection ──────────────────────────────────────────────────────

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_extension(Path::new("a.CSV")),
            Some(SourceFormat::Delimited)
        );
        assert_eq!(
            SourceFormat::from_extension(Path::new("2024-01-01.jsonl")),
            Some(SourceFormat::Structured)
        );
        assert_eq!(SourceFormat::from_extension(Path::new("data.bin")), None);
        assert_eq!(SourceFormat::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_format_sniff() {
        assert_eq!(
            SourceFormat::sniff("\n  {\"timestamp\":1}"),
            SourceFormat::Structured
        );
        assert_eq!(SourceFormat::sniff("timestamp,a"), SourceFormat::Delimited);
        assert_eq!(SourceFormat::sniff(""), SourceFormat::Delimited);
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(SourceFormat::from_name("csv"), Some(SourceFormat::Delimited));
        assert_eq!(SourceFormat::from_name("JSONL"), Some(SourceFormat::Structured));
        assert_eq!(SourceFormat::from_name("auto"), None);
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    #[test]
    fn test_read_source_strips_bom() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "a.csv", "\u{feff}timestamp,a\n");
        assert_eq!(read_source(&path).unwrap(), "timestamp,a\n");

        let table = load_source(&path, None).unwrap().table;
        assert_eq!(table.columns(), &["timestamp", "a"]);
    }

    #[test]
    fn test_load_source_missing_file_is_io_failure() {
        let tmp = TempDir::new().unwrap();
        let err = load_source(&tmp.path().join("missing.csv"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_load_source_sniffs_unknown_extension() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "capture.dat",
            r#"{"timestamp":"2024-01-01 00:00:00","values":[{"key":"a","value":1}]}"#,
        );
        let source = load_source(&path, None).unwrap();
        assert_eq!(source.table.columns(), &["timestamp", "a"]);
        assert_eq!(source.path, path);
    }

    #[test]
    fn test_load_source_forced_format() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "export.log", "timestamp,a\n2024-01-01 00:00:00,1\n");
        assert!(load_source(&path, None).is_err());

        let source = load_source(&path, Some(SourceFormat::Delimited)).unwrap();
        assert_eq!(source.table.row_count(), 1);
    }

    // ── Discovery ─────────────────────────────────────────────────────────────

    #[test]
    fn test_find_log_files_recursive_sorted() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b/2024-01-02.jsonl", "");
        write(tmp.path(), "a/2024-01-01.csv", "");
        write(tmp.path(), "a/notes.md", "");

        let files = find_log_files(tmp.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/2024-01-01.csv"));
        assert!(files[1].ends_with("b/2024-01-02.jsonl"));
    }

    #[test]
    fn test_find_log_files_skips_logger_housekeeping() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data_20240101.json", "");
        write(tmp.path(), "error.log", "Config load failed\n");
        write(tmp.path(), "config/config.json", "{}");
        write(tmp.path(), "notes.txt", "");

        let files = find_log_files(tmp.path());
        assert_eq!(files, vec![tmp.path().join("data_20240101.json")]);
    }

    #[test]
    fn test_find_log_files_root_named_config() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("config");
        write(&root, "data_20240101.csv", "");

        assert_eq!(find_log_files(&root).len(), 1);
    }

    #[test]
    fn test_named_log_file_still_detected_as_structured() {
        assert_eq!(
            SourceFormat::from_extension(Path::new("day.log")),
            Some(SourceFormat::Structured)
        );
    }

    #[test]
    fn test_find_log_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(find_log_files(&tmp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_expand_paths_mixes_files_and_dirs() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        write(&dir, "x.csv", "");
        write(&dir, "y.jsonl", "");
        let single = tmp.path().join("missing.csv");

        let expanded = expand_paths(&[single.clone(), dir]);
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[0], single);
    }
}
