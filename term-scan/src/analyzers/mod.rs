//! Column analysis and anomaly detection.
//!
//! This module provides the scanning engine: column classification, the four
//! statistical detectors and the runner that aggregates their findings into a
//! single report.
//!
//! ## Architecture
//!
//! - [`ColumnClassifier`] decides once per run whether each column is numeric
//!   or categorical
//! - [`anomaly`] holds the [`AnomalyDetector`] trait, the record types and the
//!   z-score, IQR, time-series and frequency detectors
//! - [`AnomalyScanRunner`] dispatches eligible columns to the requested
//!   detectors and builds the [`AnomalyReport`]
//!
//! ## Example
//!
//! ```rust
//! use term_scan::analyzers::{AnomalyScanRunner, DetectionConfig, DetectionMethod};
//! use term_scan::dataset::Dataset;
//!
//! # fn main() -> term_scan::error::Result<()> {
//! let mut city = vec!["Paris"; 999];
//! city.push("Atlantis");
//! let dataset = Dataset::builder().column("city", city).build()?;
//!
//! let config = DetectionConfig::builder()
//!     .methods([DetectionMethod::Frequency])
//!     .build()?;
//! let report = AnomalyScanRunner::new(config).run(&dataset)?;
//!
//! assert_eq!(report.summary.low_severity, 1);
//! # Ok(())
//! # }
//! ```

pub mod anomaly;
pub mod config;
pub mod inference;
pub mod report;
pub mod runner;
pub mod stats;

pub use anomaly::{Anomaly, AnomalyContext, AnomalyDetector, Severity};
pub use config::{DetectionConfig, DetectionConfigBuilder, DetectionMethod};
pub use inference::{ColumnClassification, ColumnClassifier, ColumnKind, ColumnStats};
pub use report::{AnomalyReport, DatasetStatistics, ReportSummary};
pub use runner::{AnomalyScanRunner, ProgressCallback};
