//! Z-score outlier detection.
//!
//! A value is an anomaly when its distance from the column mean, measured in
//! population standard deviations, exceeds the configured threshold.

use tracing::debug;

use super::{Anomaly, AnomalyContext, AnomalyDetector, Severity};
use crate::analyzers::config::{DetectionConfig, DetectionMethod};
use crate::analyzers::inference::ColumnKind;
use crate::analyzers::stats;
use crate::dataset::{Column, Dataset};

/// Minimum number of non-missing values for a stable mean and deviation.
const MIN_SAMPLES: usize = 3;

/// Flags values whose distance from the column mean, in population standard
/// deviations, exceeds a threshold.
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    /// Z-score threshold for anomaly detection (e.g., 3.0 for 3 standard deviations).
    pub z_score_threshold: f64,

    /// Z-score above which an anomaly is high severity.
    pub high_severity_z: f64,
}

impl ZScoreDetector {
    /// Creates a new Z-score detector.
    ///
    /// # Arguments
    /// * `z_score_threshold` - Number of standard deviations for anomaly threshold
    pub fn new(z_score_threshold: f64) -> Self {
        Self {
            z_score_threshold,
            high_severity_z: 4.0,
        }
    }

    /// Creates a detector from a scan configuration.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            z_score_threshold: config.threshold,
            high_severity_z: config.high_severity_z,
        }
    }
}

impl AnomalyDetector for ZScoreDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ZScore
    }

    fn column_kind(&self) -> ColumnKind {
        ColumnKind::Numeric
    }

    fn detect_column(&self, _dataset: &Dataset, col: &Column) -> Vec<Anomaly> {
        let column = col.name();
        let samples = col.numeric_values();
        if samples.len() < MIN_SAMPLES {
            debug!(column, samples = samples.len(), "Too few values for z-score detection");
            return Vec::new();
        }

        let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
        let (Some(mean), Some(std_dev)) = (stats::mean(&values), stats::std_dev(&values, 0))
        else {
            return Vec::new();
        };

        // Rounding in the mean can leave a tiny non-zero deviation for identical values.
        if std_dev == 0.0 || values.iter().all(|v| *v == values[0]) {
            debug!(column, "Zero variance, skipping z-score detection");
            return Vec::new();
        }

        samples
            .into_iter()
            .filter_map(|(row, value)| {
                let z_score = (value - mean).abs() / std_dev;
                (z_score > self.z_score_threshold).then(|| {
                    Anomaly::new(
                        DetectionMethod::ZScore,
                        Severity::from_z_score(z_score, self.high_severity_z),
                        column,
                        AnomalyContext::ZScore {
                            row,
                            value,
                            z_score,
                        },
                    )
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "ZScore"
    }

    fn description(&self) -> &str {
        "Detects values far from the column mean using population z-scores"
    }
}
