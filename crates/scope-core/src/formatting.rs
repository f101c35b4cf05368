use chrono::{DateTime, NaiveDateTime};

use crate::models::StatisticsRecord;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use scope_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a tiny epsilon so exact binary midpoints round away from zero.
    let factor = 10_f64.powi(decimals as i32);
    let scaled = abs_value * factor;
    // Past 2^52 every f64 is already an integer; nudging would shift the ulp.
    let rounded = if scaled >= 4_503_599_627_370_496.0 {
        abs_value
    } else {
        let epsilon = f64::EPSILON * scaled;
        (scaled + epsilon).round() / factor
    };

    let integer_part = rounded.trunc();
    let frac_part = rounded - integer_part;

    // `{:.0}` keeps the full magnitude where an integer cast would saturate.
    let grouped = group_thousands(&format!("{:.0}", integer_part));

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// One statistics line as shown under the chart.
///
/// # Examples
///
/// ```
/// use scope_core::formatting::format_statistics_line;
/// use scope_core::models::StatisticsRecord;
///
/// let record = StatisticsRecord {
///     name: "voltage".to_string(),
///     min: 229.5,
///     max: 231.25,
///     average: 230.125,
///     count: 4,
/// };
/// assert_eq!(
///     format_statistics_line(&record),
///     "voltage: Min = 229.50 | Max = 231.25 | Avg = 230.13"
/// );
/// ```
pub fn format_statistics_line(record: &StatisticsRecord) -> String {
    format!(
        "{}: Min = {} | Max = {} | Avg = {}",
        record.name,
        format_fixed(record.min),
        format_fixed(record.max),
        format_fixed(record.average)
    )
}

/// All statistics lines joined with `\n`; empty when there are no records.
pub fn format_statistics_summary(records: &[StatisticsRecord]) -> String {
    records
        .iter()
        .map(format_statistics_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Two-decimal rendering without grouping, midpoints away from zero.
fn format_fixed(value: f64) -> String {
    format_number(value, 2).replace(',', "")
}

/// Render a chart axis position (Unix seconds) as `HH:MM:SS`.
pub fn format_time_label(epoch_seconds: f64) -> String {
    DateTime::from_timestamp(epoch_seconds.floor() as i64, 0)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Human-readable span between two timestamps, e.g. `"2h 5m"` or `"40s"`.
pub fn format_span(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    let total_secs = (*end - *start).num_seconds().max(0);
    if total_secs < 60 {
        return format!("{}s", total_secs);
    }
    let total_mins = total_secs / 60;
    if total_mins < 60 {
        return format!("{}m", total_mins);
    }
    let hours = total_mins / 60;
    let mins = total_mins % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
