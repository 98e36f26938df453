//! The result of a scan: anomaly records plus summary and dataset statistics.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::anomaly::{Anomaly, Severity};
use super::config::DetectionMethod;
use crate::error::{ErrorContext, Result};

/// Severity counts and the methods that were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_anomalies: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
    /// Requested methods by their command-line names.
    pub methods_used: Vec<String>,
}

/// Shape of the scanned dataset and the anomaly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub dataset_rows: usize,
    pub dataset_columns: usize,
    pub numeric_columns: usize,
    /// Anomalies per hundred rows. Zero for an empty dataset. May exceed 100
    /// since one row can be flagged by several methods.
    pub anomaly_percentage: f64,
}

/// Aggregated output of an anomaly scan.
///
/// Serializes with the top-level keys `summary`, `anomalies`, `statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub summary: ReportSummary,
    pub anomalies: Vec<Anomaly>,
    pub statistics: DatasetStatistics,
}

impl AnomalyReport {
    /// Builds a report, deriving the summary and the anomaly rate from the
    /// records.
    pub fn new(
        anomalies: Vec<Anomaly>,
        methods: &[DetectionMethod],
        dataset_rows: usize,
        dataset_columns: usize,
        numeric_columns: usize,
    ) -> Self {
        let count = |severity: Severity| anomalies.iter().filter(|a| a.severity == severity).count();
        let summary = ReportSummary {
            total_anomalies: anomalies.len(),
            high_severity: count(Severity::High),
            medium_severity: count(Severity::Medium),
            low_severity: count(Severity::Low),
            methods_used: methods.iter().map(|m| m.cli_name().to_string()).collect(),
        };
        let anomaly_percentage = if dataset_rows == 0 {
            0.0
        } else {
            anomalies.len() as f64 / dataset_rows as f64 * 100.0
        };

        Self {
            summary,
            anomalies,
            statistics: DatasetStatistics {
                dataset_rows,
                dataset_columns,
                numeric_columns,
                anomaly_percentage,
            },
        }
    }

    /// Returns true when nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Anomalies of the given severity, in report order.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(move |a| a.severity == severity)
    }

    /// Anomalies produced by the given method, in report order.
    pub fn by_method(&self, method: DetectionMethod) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(move |a| a.method == method)
    }

    /// Serializes the report as JSON with 2-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the JSON form of the report to `path`.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        debug!(path = %path.display(), "Saved report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::anomaly::AnomalyContext;

    fn anomaly(severity: Severity, method: DetectionMethod) -> Anomaly {
        let context = match method {
            DetectionMethod::Frequency => AnomalyContext::Frequency {
                value: "x".to_string(),
                count: 1,
                frequency: 0.001,
            },
            _ => AnomalyContext::ZScore {
                row: 0,
                value: 1.0,
                z_score: 5.0,
            },
        };
        Anomaly::new(method, severity, "c", context)
    }

    #[test]
    fn test_summary_counts_and_rate() {
        let report = AnomalyReport::new(
            vec![
                anomaly(Severity::High, DetectionMethod::ZScore),
                anomaly(Severity::Medium, DetectionMethod::ZScore),
                anomaly(Severity::Low, DetectionMethod::Frequency),
            ],
            &[DetectionMethod::ZScore, DetectionMethod::Frequency],
            200,
            4,
            2,
        );

        assert_eq!(report.summary.total_anomalies, 3);
        assert_eq!(report.summary.high_severity, 1);
        assert_eq!(report.summary.medium_severity, 1);
        assert_eq!(report.summary.low_severity, 1);
        assert_eq!(report.summary.methods_used, vec!["zscore", "frequency"]);
        assert!((report.statistics.anomaly_percentage - 1.5).abs() < 1e-12);
        assert_eq!(report.by_method(DetectionMethod::ZScore).count(), 2);
        assert_eq!(report.by_severity(Severity::Low).count(), 1);
    }

    #[test]
    fn test_empty_dataset_has_zero_rate() {
        let report = AnomalyReport::new(Vec::new(), &[DetectionMethod::Iqr], 0, 3, 0);
        assert_eq!(report.statistics.anomaly_percentage, 0.0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_json_layout() {
        let report = AnomalyReport::new(
            vec![anomaly(Severity::High, DetectionMethod::ZScore)],
            &[DetectionMethod::ZScore],
            10,
            1,
            1,
        );
        let json = report.to_json_pretty().unwrap();

        let summary = json.find("\"summary\"").unwrap();
        let anomalies = json.find("\"anomalies\"").unwrap();
        let statistics = json.find("\"statistics\"").unwrap();
        assert!(summary < anomalies && anomalies < statistics);
        assert!(json.contains("\n  \"summary\": {"));
        assert!(json.contains("\"anomaly_percentage\": 10.0"));
    }

    #[test]
    fn test_save_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = AnomalyReport::new(
            vec![anomaly(Severity::Low, DetectionMethod::Frequency)],
            &[DetectionMethod::Frequency],
            1000,
            2,
            0,
        );
        report.save_json(&path).unwrap();

        let loaded: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded["summary"]["low_severity"], 1);
        assert_eq!(loaded["anomalies"][0]["method"], "frequency");
        assert_eq!(loaded["statistics"]["dataset_rows"], 1000);
    }
}
