//! IQR (interquartile range) based outlier detection.
//!
//! Values below `Q1 - k*IQR` or above `Q3 + k*IQR` are anomalies. Quartiles
//! use linear interpolation between order statistics.

use tracing::debug;

use super::{Anomaly, AnomalyContext, AnomalyDetector, Severity};
use crate::analyzers::config::{DetectionConfig, DetectionMethod};
use crate::analyzers::inference::ColumnKind;
use crate::analyzers::stats;
use crate::dataset::{Column, Dataset};

const MIN_SAMPLES: usize = 4;

/// Fence-based outlier detector.
#[derive(Debug, Clone)]
pub struct IqrDetector {
    /// Multiplier for IQR (1.5 = outliers, 3.0 = extreme outliers)
    pub k: f64,
    /// Distance beyond the nearer fence, in IQR units, for high severity.
    pub high_severity_factor: f64,
}

impl Default for IqrDetector {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl IqrDetector {
    /// Creates a new IQR detector with fence multiplier `k`.
    pub fn new(k: f64) -> Self {
        Self {
            k,
            high_severity_factor: 2.0,
        }
    }

    /// Creates a detector from a scan configuration.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            k: config.iqr_multiplier,
            high_severity_factor: config.iqr_high_severity_factor,
        }
    }

    /// Computes `(q1, q3, iqr)` for unsorted data.
    fn compute_quartiles(data: &[f64]) -> Option<(f64, f64, f64)> {
        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q1 = stats::quantile_sorted(&sorted, 0.25)?;
        let q3 = stats::quantile_sorted(&sorted, 0.75)?;
        Some((q1, q3, q3 - q1))
    }
}

impl AnomalyDetector for IqrDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Iqr
    }

    fn column_kind(&self) -> ColumnKind {
        ColumnKind::Numeric
    }

    fn detect_column(&self, _dataset: &Dataset, col: &Column) -> Vec<Anomaly> {
        let column = col.name();
        let samples = col.numeric_values();
        if samples.len() < MIN_SAMPLES {
            debug!(column, samples = samples.len(), "Too few values for IQR detection");
            return Vec::new();
        }

        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        let Some((q1, q3, iqr)) = Self::compute_quartiles(&values) else {
            return Vec::new();
        };
        let lower = q1 - self.k * iqr;
        let upper = q3 + self.k * iqr;
        let bounds = format!("[{lower:.2}, {upper:.2}]");

        debug!(column, q1, q3, iqr, lower, upper, "Computed IQR fences");

        samples
            .into_iter()
            .filter(|(_, value)| *value < lower || *value > upper)
            .map(|(row, value)| {
                let distance = (value - lower).abs().min((value - upper).abs());
                Anomaly::new(
                    DetectionMethod::Iqr,
                    Severity::from_fence_distance(distance, iqr, self.high_severity_factor),
                    column,
                    AnomalyContext::Iqr {
                        row,
                        value,
                        bounds: bounds.clone(),
                    },
                )
            })
            .collect()
    }

    fn name(&self) -> &str {
        "IQR"
    }

    fn description(&self) -> &str {
        "Detects values outside the interquartile range fences"
    }
}
