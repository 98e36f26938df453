//! Prelude for commonly used types and traits in term-scan.

pub use crate::analyzers::{
    Anomaly, AnomalyDetector, AnomalyReport, AnomalyScanRunner, DetectionConfig, DetectionMethod,
    Severity,
};
pub use crate::dataset::{Column, Dataset, Value};
pub use crate::error::{ErrorContext, Result, TermError};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::logging::LogConfig;
pub use crate::sources::{CsvOptions, CsvSource};
