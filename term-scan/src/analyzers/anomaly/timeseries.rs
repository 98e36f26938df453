//! Time-series detection over daily aggregates.
//!
//! Rows are grouped by their parsed timestamp and the value column is summed
//! per group. Each aggregate is then compared with a centered rolling mean and
//! sample standard deviation of its neighbours.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use super::{Anomaly, AnomalyContext, AnomalyDetector, Severity};
use crate::analyzers::config::{DetectionConfig, DetectionMethod};
use crate::analyzers::inference::ColumnKind;
use crate::analyzers::stats;
use crate::dataset::{Column, Dataset};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

const REPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a date or timestamp cell.
///
/// Plain dates become midnight timestamps. RFC 3339 values with an offset are
/// normalised to UTC.
///
/// ```rust
/// use term_scan::analyzers::anomaly::parse_timestamp;
///
/// let ts = parse_timestamp("2024-03-01").unwrap();
/// assert_eq!(ts.to_string(), "2024-03-01 00:00:00");
/// assert_eq!(parse_timestamp("01.03.2024"), Some(ts));
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Flags daily sums that deviate from their rolling neighbourhood.
#[derive(Debug, Clone)]
pub struct TimeSeriesDetector {
    /// Column holding the dates.
    pub date_column: String,
    /// Rolling z threshold.
    pub threshold: f64,
    /// Rolling z above which an anomaly is high severity.
    pub high_severity_z: f64,
    /// Upper bound on the rolling window.
    pub max_window: usize,
    /// Minimum number of aggregates required.
    pub min_aggregate_points: usize,
}

impl TimeSeriesDetector {
    /// Creates a detector grouping by `date_column`.
    pub fn new(date_column: impl Into<String>, threshold: f64) -> Self {
        Self {
            date_column: date_column.into(),
            threshold,
            high_severity_z: 4.0,
            max_window: 7,
            min_aggregate_points: 7,
        }
    }

    /// Creates a detector from a scan configuration, or `None` when no date
    /// column was configured.
    pub fn from_config(config: &DetectionConfig) -> Option<Self> {
        let date_column = config.date_column.clone()?;
        Some(Self {
            date_column,
            threshold: config.threshold,
            high_severity_z: config.high_severity_z,
            max_window: config.max_window,
            min_aggregate_points: config.min_aggregate_points,
        })
    }

    /// Sums `values` per parsed timestamp of `dates`.
    ///
    /// Missing dates are dropped; any other unparsable date abandons the
    /// whole column. Missing values count as zero.
    fn aggregate(&self, dates: &Column, values: &Column) -> Option<BTreeMap<NaiveDateTime, f64>> {
        let mut sums = BTreeMap::new();
        for (date, value) in dates.values().iter().zip(values.values()) {
            if date.is_missing() {
                continue;
            }
            let Some(ts) = parse_timestamp(&date.to_string()) else {
                debug!(
                    column = values.name(),
                    date_column = %self.date_column,
                    date = %date,
                    "Unparsable date, skipping time-series detection"
                );
                return None;
            };
            *sums.entry(ts).or_insert(0.0) += value.as_f64().unwrap_or(0.0);
        }
        Some(sums)
    }
}

impl AnomalyDetector for TimeSeriesDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::TimeSeries
    }

    fn column_kind(&self) -> ColumnKind {
        ColumnKind::Numeric
    }

    fn detect_column(&self, dataset: &Dataset, col: &Column) -> Vec<Anomaly> {
        let column = col.name();
        if column == self.date_column {
            return Vec::new();
        }
        let Some(dates) = dataset.column(&self.date_column) else {
            debug!(date_column = %self.date_column, "Date column not found");
            return Vec::new();
        };
        let Some(sums) = self.aggregate(dates, col) else {
            return Vec::new();
        };
        if sums.len() < self.min_aggregate_points {
            debug!(column, points = sums.len(), "Too few aggregates for time-series detection");
            return Vec::new();
        }

        let (timestamps, totals): (Vec<NaiveDateTime>, Vec<f64>) = sums.into_iter().unzip();
        let window = self.max_window.min(totals.len() / 3);
        let rolling = stats::centered_rolling(&totals, window);

        timestamps
            .iter()
            .zip(&totals)
            .zip(rolling)
            .filter_map(|((ts, &value), stats)| {
                let (mean, std_dev) = stats?;
                if std_dev <= 0.0 {
                    return None;
                }
                let z_score = (value - mean).abs() / std_dev;
                (z_score > self.threshold).then(|| {
                    Anomaly::new(
                        DetectionMethod::TimeSeries,
                        Severity::from_z_score(z_score, self.high_severity_z),
                        column,
                        AnomalyContext::TimeSeries {
                            date: ts.format(REPORT_DATE_FORMAT).to_string(),
                            value,
                            expected_range: format!(
                                "{:.2} to {:.2}",
                                mean - 2.0 * std_dev,
                                mean + 2.0 * std_dev
                            ),
                            z_score,
                        },
                    )
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "TimeSeries"
    }

    fn description(&self) -> &str {
        "Detects daily totals outside their centered rolling range"
    }
}
