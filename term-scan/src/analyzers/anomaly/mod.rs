//! Anomaly records and the four column detectors.
//!
//! ## Architecture
//!
//! Each detector implements [`AnomalyDetector`] and inspects one column at a
//! time:
//! - [`ZScoreDetector`]: standardized deviation from the column mean
//! - [`IqrDetector`]: values outside the `Q1 - k*IQR .. Q3 + k*IQR` fence
//! - [`TimeSeriesDetector`]: per-date sums against a centered rolling window
//! - [`FrequencyDetector`]: rare categorical values
//!
//! Detectors never fail. A column of the wrong kind, with too few values, or
//! with unparsable dates yields an empty list. Severity is always derived from
//! the magnitude that triggered the detection.
//!
//! ## Example
//!
//! ```rust
//! use term_scan::analyzers::anomaly::{AnomalyDetector, Severity, ZScoreDetector};
//! use term_scan::dataset::Dataset;
//!
//! let dataset = Dataset::builder()
//!     .column("x", [1.0, 1.0, 1.0, 1.0, 1.0, 100.0])
//!     .build()
//!     .unwrap();
//!
//! let detector = ZScoreDetector::new(2.0);
//! let anomalies = detector.detect(&dataset, "x");
//! assert_eq!(anomalies.len(), 1);
//! assert_eq!(anomalies[0].row(), Some(5));
//! assert_eq!(anomalies[0].severity, Severity::Medium);
//! ```

mod frequency;
mod iqr;
mod timeseries;
mod zscore;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::config::DetectionMethod;
use crate::analyzers::inference::{ColumnClassifier, ColumnKind};
use crate::dataset::{Column, Dataset};

pub use frequency::{FrequencyDetector, MISSING_LABEL};
pub use iqr::IqrDetector;
pub use timeseries::{parse_timestamp, TimeSeriesDetector};
pub use zscore::ZScoreDetector;

/// Coarse severity tier of an anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Severity of a z-based detection: high above `high_z`, medium otherwise.
    pub fn from_z_score(z_score: f64, high_z: f64) -> Self {
        if z_score > high_z {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    /// Severity of an IQR detection: high when the value lies more than
    /// `factor * iqr` beyond the nearer fence, medium otherwise.
    pub fn from_fence_distance(distance: f64, iqr: f64, factor: f64) -> Self {
        if distance > factor * iqr {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    /// Lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method-specific context of an anomaly.
///
/// Serialized flat into the anomaly record, so each variant contributes its
/// own keys (`row`, `value`, `z_score`, `bounds`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnomalyContext {
    /// A value whose z-score exceeded the threshold.
    ZScore { row: usize, value: f64, z_score: f64 },
    /// A value outside the IQR fences; `bounds` is `"[lower, upper]"`.
    Iqr { row: usize, value: f64, bounds: String },
    /// A daily aggregate outside its rolling expectation.
    TimeSeries {
        date: String,
        value: f64,
        expected_range: String,
        z_score: f64,
    },
    /// A rare categorical value.
    Frequency {
        value: String,
        count: usize,
        frequency: f64,
    },
}

/// One flagged observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// The method that flagged the observation.
    pub method: DetectionMethod,
    /// Severity derived from the detection magnitude.
    pub severity: Severity,
    /// The column the observation belongs to.
    pub column: String,
    /// Method-specific details.
    #[serde(flatten)]
    pub context: AnomalyContext,
}

impl Anomaly {
    pub(crate) fn new(
        method: DetectionMethod,
        severity: Severity,
        column: impl Into<String>,
        context: AnomalyContext,
    ) -> Self {
        Self {
            method,
            severity,
            column: column.into(),
            context,
        }
    }

    /// The original row index, for row-level detections.
    pub fn row(&self) -> Option<usize> {
        match self.context {
            AnomalyContext::ZScore { row, .. } | AnomalyContext::Iqr { row, .. } => Some(row),
            _ => None,
        }
    }

    /// The flagged numeric value, when the detection is numeric.
    pub fn numeric_value(&self) -> Option<f64> {
        match self.context {
            AnomalyContext::ZScore { value, .. }
            | AnomalyContext::Iqr { value, .. }
            | AnomalyContext::TimeSeries { value, .. } => Some(value),
            AnomalyContext::Frequency { .. } => None,
        }
    }

    /// The z-score behind the detection, for z-based methods.
    pub fn z_score(&self) -> Option<f64> {
        match self.context {
            AnomalyContext::ZScore { z_score, .. } | AnomalyContext::TimeSeries { z_score, .. } => {
                Some(z_score)
            }
            _ => None,
        }
    }

    /// Ordered `(field, rendered value)` pairs describing the anomaly, without
    /// the method and severity.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(5);
        match &self.context {
            AnomalyContext::ZScore {
                row,
                value,
                z_score,
            } => {
                fields.push(("row", row.to_string()));
                fields.push(("column", self.column.clone()));
                fields.push(("value", value.to_string()));
                fields.push(("z_score", z_score.to_string()));
            }
            AnomalyContext::Iqr { row, value, bounds } => {
                fields.push(("row", row.to_string()));
                fields.push(("column", self.column.clone()));
                fields.push(("value", value.to_string()));
                fields.push(("bounds", bounds.clone()));
            }
            AnomalyContext::TimeSeries {
                date,
                value,
                expected_range,
                z_score,
            } => {
                fields.push(("date", date.clone()));
                fields.push(("column", self.column.clone()));
                fields.push(("value", value.to_string()));
                fields.push(("expected_range", expected_range.clone()));
                fields.push(("z_score", z_score.to_string()));
            }
            AnomalyContext::Frequency {
                value,
                count,
                frequency,
            } => {
                fields.push(("column", self.column.clone()));
                fields.push(("value", value.clone()));
                fields.push(("count", count.to_string()));
                fields.push(("frequency", frequency.to_string()));
            }
        }
        fields
    }
}

/// A per-column anomaly detector.
pub trait AnomalyDetector {
    /// The method this detector implements.
    fn method(&self) -> DetectionMethod;

    /// The column kind this detector accepts.
    fn column_kind(&self) -> ColumnKind;

    /// Detects anomalies in a column already known to be of [`Self::column_kind`].
    fn detect_column(&self, dataset: &Dataset, column: &Column) -> Vec<Anomaly>;

    /// Detects anomalies in the named column.
    ///
    /// Returns an empty list when the column is missing, of the wrong kind,
    /// or has too little data.
    fn detect(&self, dataset: &Dataset, column: &str) -> Vec<Anomaly> {
        let Some(col) = dataset.column(column) else {
            return Vec::new();
        };
        if ColumnClassifier::new().classify(col) != self.column_kind() {
            return Vec::new();
        }
        self.detect_column(dataset, col)
    }

    /// Returns the name of this detector.
    fn name(&self) -> &str;

    /// Returns a description of this detector.
    fn description(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_z_score() {
        assert_eq!(Severity::from_z_score(4.5, 4.0), Severity::High);
        assert_eq!(Severity::from_z_score(4.0, 4.0), Severity::Medium);
        assert_eq!(Severity::from_z_score(3.1, 4.0), Severity::Medium);
    }

    #[test]
    fn test_severity_from_fence_distance() {
        assert_eq!(Severity::from_fence_distance(5.0, 2.0, 2.0), Severity::High);
        assert_eq!(Severity::from_fence_distance(4.0, 2.0, 2.0), Severity::Medium);
        // A zero IQR makes any positive distance high severity.
        assert_eq!(Severity::from_fence_distance(0.5, 0.0, 2.0), Severity::High);
    }

    #[test]
    fn test_anomaly_serializes_flat() {
        let anomaly = Anomaly::new(
            DetectionMethod::ZScore,
            Severity::High,
            "x",
            AnomalyContext::ZScore {
                row: 5,
                value: 100.0,
                z_score: 4.47,
            },
        );
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["method"], "z-score");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["column"], "x");
        assert_eq!(json["row"], 5);
        assert_eq!(json["value"], 100.0);
        assert_eq!(json["z_score"], 4.47);
    }

    #[test]
    fn test_frequency_anomaly_serialization() {
        let anomaly = Anomaly::new(
            DetectionMethod::Frequency,
            Severity::Low,
            "city",
            AnomalyContext::Frequency {
                value: "Atlantis".to_string(),
                count: 2,
                frequency: 0.002,
            },
        );
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["method"], "frequency");
        assert_eq!(json["value"], "Atlantis");
        assert_eq!(json["count"], 2);
        assert!(json.get("row").is_none());
        assert_eq!(anomaly.row(), None);
        assert_eq!(anomaly.numeric_value(), None);
    }

    #[test]
    fn test_fields_order() {
        let anomaly = Anomaly::new(
            DetectionMethod::Iqr,
            Severity::Medium,
            "amount",
            AnomalyContext::Iqr {
                row: 3,
                value: 42.0,
                bounds: "[1.00, 9.00]".to_string(),
            },
        );
        let names: Vec<&str> = anomaly.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["row", "column", "value", "bounds"]);
    }
}
