use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the log scope pipeline.
#[derive(Error, Debug)]
pub enum ScopeError {
    /// A source file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of a source file could not be parsed.
    #[error("Failed to parse {path} at line {line}: {message}")]
    RecordParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A delimited header declares the same column twice.
    #[error("Duplicate column '{column}' in {path}")]
    DuplicateColumn { path: PathBuf, column: String },

    /// None of the contributing sources declares a timestamp column.
    #[error("No source contains a '{0}' column")]
    MissingTimestampColumn(String),

    /// Every row was rejected by the timestamp filter.
    #[error("No rows with a valid timestamp found in {sources} source(s)")]
    NoValidData { sources: usize },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScopeError {
    /// Classify the error into the coarse taxonomy surfaced to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScopeError::FileRead { .. } | ScopeError::Io(_) => ErrorKind::IoFailure,
            ScopeError::RecordParse { .. }
            | ScopeError::DuplicateColumn { .. }
            | ScopeError::MissingTimestampColumn(_) => ErrorKind::ParseFailure,
            ScopeError::NoValidData { .. } => ErrorKind::NoValidData,
            ScopeError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Convenience alias used throughout the scope crates.
pub type Result<T> = std::result::Result<T, ScopeError>;

// ── ErrorKind ─────────────────────────────────────────────────────────────────

/// Coarse error category reported at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File unreadable or missing.
    IoFailure,
    /// Malformed structured record, bad header, or no timestamp column.
    ParseFailure,
    /// Zero rows survived timestamp/column filtering.
    NoValidData,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::IoFailure => "I/O failure",
            ErrorKind::ParseFailure => "Parse failure",
            ErrorKind::NoValidData => "No valid data",
            ErrorKind::Config => "Configuration error",
        };
        f.write_str(label)
    }
}

// ── ReportedError ─────────────────────────────────────────────────────────────

/// An escalated failure converted into a message for the caller's error
/// channel. Unlike [`ScopeError`] it is cheap to clone and compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ScopeError> for ReportedError {
    fn from(err: &ScopeError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ScopeError::FileRead {
            path: PathBuf::from("/some/log.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/log.csv"));
        assert!(msg.contains("no such file"));
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_error_display_record_parse() {
        let err = ScopeError::RecordParse {
            path: PathBuf::from("day.jsonl"),
            line: 3,
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse day.jsonl at line 3: expected value"
        );
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_error_display_missing_timestamp() {
        let err = ScopeError::MissingTimestampColumn("timestamp".to_string());
        assert_eq!(err.to_string(), "No source contains a 'timestamp' column");
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_error_display_no_valid_data() {
        let err = ScopeError::NoValidData { sources: 2 };
        assert_eq!(
            err.to_string(),
            "No rows with a valid timestamp found in 2 source(s)"
        );
        assert_eq!(err.kind(), ErrorKind::NoValidData);
    }

    #[test]
    fn test_error_duplicate_column_is_parse_failure() {
        let err = ScopeError::DuplicateColumn {
            path: PathBuf::from("a.csv"),
            column: "voltage".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate column 'voltage' in a.csv");
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ScopeError = io_err.into();
        assert!(err.to_string().contains("denied"));
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_reported_error_from_scope_error() {
        let err = ScopeError::NoValidData { sources: 1 };
        let reported = ReportedError::from(&err);
        assert_eq!(reported.kind, ErrorKind::NoValidData);
        assert_eq!(
            reported.to_string(),
            "No valid data: No rows with a valid timestamp found in 1 source(s)"
        );
    }
}
