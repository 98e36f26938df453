//! Orchestration of a full anomaly scan.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::anomaly::{
    Anomaly, AnomalyDetector, FrequencyDetector, IqrDetector, TimeSeriesDetector, ZScoreDetector,
};
use super::config::{DetectionConfig, DetectionMethod};
use super::inference::{ColumnClassification, ColumnClassifier};
use super::report::AnomalyReport;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::log_column_detail;
use crate::logging::{truncate_field, LogConfig};

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Runs the requested detectors over every eligible column and aggregates
/// their findings into an [`AnomalyReport`].
///
/// Columns are classified once per run. Methods execute in their canonical
/// order (z-score, IQR, time-series, frequency) and, within a method, columns
/// are visited in declared order, so the report is deterministic for a given
/// dataset and configuration.
///
/// # Example
///
/// ```rust
/// use term_scan::analyzers::{AnomalyScanRunner, DetectionConfig, DetectionMethod};
/// use term_scan::dataset::Dataset;
///
/// # fn main() -> term_scan::error::Result<()> {
/// let dataset = Dataset::builder()
///     .column("x", [1.0, 1.0, 1.0, 1.0, 1.0, 100.0])
///     .build()?;
///
/// let config = DetectionConfig::builder()
///     .methods([DetectionMethod::Iqr])
///     .build()?;
///
/// let report = AnomalyScanRunner::new(config)
///     .on_progress(|progress| println!("Scan progress: {:.1}%", progress * 100.0))
///     .run(&dataset)?;
///
/// assert_eq!(report.summary.total_anomalies, 1);
/// assert_eq!(report.summary.high_severity, 1);
/// # Ok(())
/// # }
/// ```
pub struct AnomalyScanRunner {
    config: DetectionConfig,
    log_config: LogConfig,
    on_progress: Option<ProgressCallback>,
}

impl Default for AnomalyScanRunner {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl AnomalyScanRunner {
    /// Creates a runner for the given configuration.
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            log_config: LogConfig::default(),
            on_progress: None,
        }
    }

    /// Returns the configuration this runner uses.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Sets the logging knobs used during the scan.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Sets a progress callback that will be called during execution.
    ///
    /// The callback receives a value in `(0, 1]` after each (method, column)
    /// unit of work.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Scans the dataset.
    ///
    /// Fails only when the configuration is invalid; columns that cannot be
    /// analyzed contribute no anomalies.
    #[instrument(skip(self, dataset), fields(
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        methods = self.config.methods.len()
    ))]
    pub fn run(&self, dataset: &Dataset) -> Result<AnomalyReport> {
        self.config.validate()?;
        info!("Starting anomaly scan with {} methods", self.config.methods.len());

        let classification = ColumnClassifier::new().classify_dataset(dataset);
        let detectors = self.detectors();

        let total_units: usize = detectors
            .iter()
            .map(|d| classification.columns_of(d.column_kind()).len())
            .sum();
        let mut completed = 0usize;
        let mut anomalies: Vec<Anomaly> = Vec::new();

        for detector in &detectors {
            let method = detector.method();
            for name in classification.columns_of(detector.column_kind()) {
                let Some(column) = dataset.column(name) else {
                    continue;
                };
                let found = detector.detect_column(dataset, column);
                if found.is_empty() {
                    debug!(method = %method, column = name, "No anomalies");
                } else {
                    info!(
                        method = %method,
                        column = name,
                        anomalies = found.len(),
                        "{}: Found {} anomalies in '{}'",
                        detector.name(),
                        found.len(),
                        name
                    );
                }
                for anomaly in &found {
                    log_column_detail!(
                        self.log_config,
                        method = %method,
                        column = name,
                        severity = %anomaly.severity,
                        details = %self.describe(anomaly),
                        "Flagged anomaly"
                    );
                }
                anomalies.extend(found);

                completed += 1;
                if let Some(ref callback) = self.on_progress {
                    callback(completed as f64 / total_units as f64);
                }
            }
        }

        let report = self.build_report(dataset, &classification, anomalies);
        info!(
            total = report.summary.total_anomalies,
            high = report.summary.high_severity,
            medium = report.summary.medium_severity,
            low = report.summary.low_severity,
            "Anomaly scan completed"
        );
        Ok(report)
    }

    /// Instantiates one detector per requested method, in execution order.
    fn detectors(&self) -> Vec<Box<dyn AnomalyDetector>> {
        let mut detectors: Vec<Box<dyn AnomalyDetector>> = Vec::new();
        let mut methods = self.config.methods.clone();
        methods.sort();
        methods.dedup();

        for method in methods {
            match method {
                DetectionMethod::ZScore => {
                    detectors.push(Box::new(ZScoreDetector::from_config(&self.config)))
                }
                DetectionMethod::Iqr => {
                    detectors.push(Box::new(IqrDetector::from_config(&self.config)))
                }
                DetectionMethod::TimeSeries => match TimeSeriesDetector::from_config(&self.config)
                {
                    Some(detector) => detectors.push(Box::new(detector)),
                    None => debug!("No date column configured, skipping time-series detection"),
                },
                DetectionMethod::Frequency => {
                    detectors.push(Box::new(FrequencyDetector::from_config(&self.config)))
                }
            }
        }
        detectors
    }

    fn describe(&self, anomaly: &Anomaly) -> String {
        let details = anomaly
            .fields()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        truncate_field(&details, self.log_config.max_field_length)
    }

    fn build_report(
        &self,
        dataset: &Dataset,
        classification: &ColumnClassification,
        anomalies: Vec<Anomaly>,
    ) -> AnomalyReport {
        AnomalyReport::new(
            anomalies,
            &self.config.methods,
            dataset.row_count(),
            dataset.column_count(),
            classification.numeric_columns().len(),
        )
    }
}
