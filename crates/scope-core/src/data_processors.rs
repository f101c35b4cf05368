use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::trace;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses timestamp cells written by data loggers and spreadsheet exports.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Date-time patterns tried in order after RFC 3339 / RFC 2822.
    const DATETIME_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    const DATE_FORMATS: &'static [&'static str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

    /// Parse a raw timestamp cell into a wall-clock [`NaiveDateTime`].
    ///
    /// Handles:
    /// * RFC 3339 with `Z` or an offset → converted to UTC wall time.
    /// * RFC 2822 (email date format) → UTC wall time.
    /// * `YYYY-MM-DD HH:MM:SS` (the logger's native format) and the common
    ///   invariant-culture variants, with or without fractional seconds.
    /// * Date-only cells → midnight.
    ///
    /// Returns `None` for anything else, including blank cells.
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.naive_utc());
        }

        for fmt in Self::DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        for fmt in Self::DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        trace!("could not parse timestamp \"{}\"", s);
        None
    }
}

// ── ValueNormalizer ───────────────────────────────────────────────────────────

/// Converts raw measurement cells into finite doubles.
///
/// Both `.` and `,` are accepted as the decimal separator. The accepted
/// shapes follow the invariant "any number" style: surrounding whitespace,
/// a leading or trailing sign, parenthesised negatives and an exponent.
pub struct ValueNormalizer;

impl ValueNormalizer {
    /// Normalize `raw` to a finite `f64`, or `None` when it is not a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_core::data_processors::ValueNormalizer;
    ///
    /// assert_eq!(ValueNormalizer::parse("3,14"), Some(3.14));
    /// assert_eq!(ValueNormalizer::parse(" 3.14 "), Some(3.14));
    /// assert_eq!(ValueNormalizer::parse("(2.5)"), Some(-2.5));
    /// assert_eq!(ValueNormalizer::parse("1,234.5"), None);
    /// assert_eq!(ValueNormalizer::parse(""), None);
    /// ```
    pub fn parse(raw: &str) -> Option<f64> {
        let text = raw.trim().replace(',', ".");
        if text.is_empty() {
            return None;
        }

        let caps = number_pattern().captures(&text)?;

        let parenthesised = caps.name("open").is_some();
        if parenthesised != caps.name("close").is_some() {
            return None;
        }

        let lead = caps.name("lead").map(|m| m.as_str());
        let trail = caps.name("trail").map(|m| m.as_str());
        if lead.is_some() && trail.is_some() {
            return None;
        }

        let magnitude: f64 = caps.name("num")?.as_str().parse().ok()?;
        let negative = matches!(lead.or(trail), Some("-"));
        let value = if negative != parenthesised {
            -magnitude
        } else {
            magnitude
        };

        value.is_finite().then_some(value)
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<open>\()?\s*(?P<lead>[+-])?\s*(?P<num>(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*(?P<trail>[+-])?\s*(?P<close>\))?$",
        )
        .expect("regex is valid")
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
