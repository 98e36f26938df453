//! Error types for the Term anomaly scanner.
//!
//! Only failures that abort a whole run are represented here: the input file
//! cannot be read, the tabular data is malformed, or the detection request is
//! invalid. Per-column analysis problems never surface as errors; a column
//! that cannot be analyzed simply contributes no anomalies.

use thiserror::Error;

/// The main error type for the Term anomaly scanner.
#[derive(Error, Debug)]
pub enum TermError {
    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from data source operations.
    #[error("Data source error: {message}")]
    DataSource {
        /// Type of data source (e.g., "CSV")
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when parsing or processing data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error when a required column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates a new data source error.
    pub fn data_source(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new data source error with a source error.
    pub fn data_source_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::DataSource {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<serde_json::Error> for TermError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<TermError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
            other => TermError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
                other => TermError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
