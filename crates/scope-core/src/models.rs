use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Name of the reserved column every row is keyed by.
///
/// Matched case-insensitively; never offered as a selectable measurement.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Returns `true` when `name` is the reserved timestamp column.
pub fn is_timestamp_column(name: &str) -> bool {
    name.eq_ignore_ascii_case(TIMESTAMP_COLUMN)
}

/// A named numeric column the caller can select for plotting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Column name, case-sensitive.
    pub name: String,
    /// Physical unit reported by the logger (e.g. `"V"`), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Whether the measurement contributes a series and statistics.
    #[serde(default)]
    pub selected: bool,
}

impl Measurement {
    /// Create an unselected measurement.
    pub fn new(name: impl Into<String>, unit: Option<String>) -> Self {
        Self {
            name: name.into(),
            unit,
            selected: false,
        }
    }

    /// Name with the unit appended in brackets, e.g. `"voltage_l1-n [V]"`.
    pub fn label(&self) -> String {
        match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{} [{}]", self.name, unit),
            _ => self.name.clone(),
        }
    }
}

/// One normalized sample of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Sample time as written by the logger (no timezone attached).
    pub time: NaiveDateTime,
    /// Always finite.
    pub value: f64,
}

/// The ordered point sequence of one selected measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(x, y)` pairs with `x` as Unix seconds, the shape chart widgets want.
    pub fn as_xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (to_epoch_seconds(&p.time), p.value))
            .collect()
    }
}

/// Min/max/average over the successfully normalized values of a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// Number of values that contributed.
    pub count: usize,
}

/// Convert a naive timestamp to fractional Unix seconds (treated as UTC).
pub fn to_epoch_seconds(time: &NaiveDateTime) -> f64 {
    let utc = time.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_millis()) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_timestamp_column_case_insensitive() {
        assert!(is_timestamp_column("timestamp"));
        assert!(is_timestamp_column("Timestamp"));
        assert!(is_timestamp_column("TIMESTAMP"));
        assert!(!is_timestamp_column("timestamps"));
        assert!(!is_timestamp_column("time"));
    }

    #[test]
    fn test_measurement_new_is_unselected() {
        let m = Measurement::new("voltage_l1-n", None);
        assert!(!m.selected);
        assert_eq!(m.label(), "voltage_l1-n");
    }

    #[test]
    fn test_measurement_label_with_unit() {
        let m = Measurement::new("current_l1", Some("A".to_string()));
        assert_eq!(m.label(), "current_l1 [A]");

        let blank = Measurement::new("pf", Some(String::new()));
        assert_eq!(blank.label(), "pf");
    }

    #[test]
    fn test_series_as_xy() {
        let mut series = Series::new("a");
        series.points.push(Point {
            time: at(0, 0, 0),
            value: 1.5,
        });
        series.points.push(Point {
            time: at(0, 0, 10),
            value: 2.5,
        });

        let xy = series.as_xy();
        assert_eq!(xy.len(), 2);
        assert!((xy[1].0 - xy[0].0 - 10.0).abs() < 1e-9);
        assert!((xy[1].1 - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_to_epoch_seconds() {
        let t = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_milli_opt(0, 1, 0, 500)
            .unwrap();
        assert!((to_epoch_seconds(&t) - 60.5).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_record_serializes() {
        let record = StatisticsRecord {
            name: "a".to_string(),
            min: 1.0,
            max: 3.0,
            average: 2.0,
            count: 3,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "a");
        assert_eq!(json["count"], 3);
    }
}
