//! # Term Scan - Statistical Anomaly Detection for Tabular Data
//!
//! Term Scan inspects a CSV dataset and flags values that deviate from the
//! patterns around them. It is an offline utility: the whole file is loaded
//! into memory, every requested method runs once, and the findings are
//! returned as a single [`AnomalyReport`](analyzers::AnomalyReport).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use term_scan::prelude::*;
//! use term_scan::formatters::HumanFormatter;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let dataset = CsvSource::new("data/transactions.csv").load().await?;
//!
//! let config = DetectionConfig::builder()
//!     .methods([DetectionMethod::ZScore, DetectionMethod::Iqr, DetectionMethod::TimeSeries])
//!     .date_column("date")
//!     .threshold(3.0)
//!     .build()?;
//!
//! let report = AnomalyScanRunner::new(config).run(&dataset)?;
//! println!("{}", HumanFormatter::new().format(&report)?);
//! report.save_json("anomalies.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Detection Methods
//!
//! - **Z-score**: values more than `threshold` population standard deviations
//!   from the column mean
//! - **IQR**: values outside `Q1 - 1.5*IQR .. Q3 + 1.5*IQR`
//! - **Time-series**: per-date sums compared with a centered rolling window
//! - **Frequency**: categorical values that are both under 1% of rows and
//!   seen fewer than 10 times
//!
//! Numeric methods only look at numeric columns and the frequency method only
//! at categorical ones. Columns are classified once per run.
//!
//! ## Architecture
//!
//! - **`dataset`**: the in-memory table and its cell values
//! - **`sources`**: CSV loading through DataFusion
//! - **`analyzers`**: column classification, the detectors, the scan runner
//!   and the report
//! - **`formatters`**: human, JSON and Markdown rendering of a report
//! - **`logging`**: logging configuration and subscriber setup

pub mod analyzers;
pub mod dataset;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod sources;
