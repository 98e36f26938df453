//! Rare-category detection for categorical columns.
//!
//! A value is an anomaly when it is both rare relative to the row count and
//! seen only a handful of times.

use std::collections::HashMap;

use tracing::debug;

use super::{Anomaly, AnomalyContext, AnomalyDetector, Severity};
use crate::analyzers::config::{DetectionConfig, DetectionMethod};
use crate::analyzers::inference::ColumnKind;
use crate::dataset::{Column, Dataset, Value};

/// Label of the bucket holding missing categorical cells.
pub const MISSING_LABEL: &str = "<missing>";

/// Flags categorical values that are both rare in relative terms and few in
/// absolute terms.
#[derive(Debug, Clone)]
pub struct FrequencyDetector {
    /// Relative frequency strictly below which a value is rare.
    pub max_frequency: f64,
    /// Occurrence count strictly below which a value is rare.
    pub max_count: usize,
    /// Whether missing cells form a [`MISSING_LABEL`] bucket.
    pub count_missing: bool,
}

impl Default for FrequencyDetector {
    fn default() -> Self {
        Self {
            max_frequency: 0.01,
            max_count: 10,
            count_missing: true,
        }
    }
}

impl FrequencyDetector {
    /// Creates a detector with the given rarity thresholds.
    pub fn new(max_frequency: f64, max_count: usize) -> Self {
        Self {
            max_frequency,
            max_count,
            ..Self::default()
        }
    }

    /// Creates a detector from a scan configuration.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            max_frequency: config.rare_frequency,
            max_count: config.rare_max_count,
            count_missing: config.count_missing_as_category,
        }
    }

    /// Counts distinct values, ordered by count descending and then by first
    /// appearance.
    fn value_counts(&self, column: &Column) -> Vec<(String, usize)> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for value in column.values() {
            let label = match value {
                Value::Missing if !self.count_missing => continue,
                Value::Missing => MISSING_LABEL.to_string(),
                other => other.to_string(),
            };
            match positions.get(&label) {
                Some(&index) => counts[index].1 += 1,
                None => {
                    positions.insert(label.clone(), counts.len());
                    counts.push((label, 1));
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

impl AnomalyDetector for FrequencyDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Frequency
    }

    fn column_kind(&self) -> ColumnKind {
        ColumnKind::Categorical
    }

    fn detect_column(&self, _dataset: &Dataset, col: &Column) -> Vec<Anomaly> {
        let column = col.name();
        let total = col.len();
        if total == 0 {
            return Vec::new();
        }

        let counts = self.value_counts(col);
        debug!(column, distinct = counts.len(), total, "Counted categorical values");

        counts
            .into_iter()
            .filter_map(|(value, count)| {
                let frequency = count as f64 / total as f64;
                (frequency < self.max_frequency && count < self.max_count).then(|| {
                    Anomaly::new(
                        DetectionMethod::Frequency,
                        Severity::Low,
                        column,
                        AnomalyContext::Frequency {
                            value,
                            count,
                            frequency,
                        },
                    )
                })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "Frequency"
    }

    fn description(&self) -> &str {
        "Detects rare categorical values"
    }
}
