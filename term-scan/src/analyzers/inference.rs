//! Column classification for routing columns to detectors.
//!
//! Every column is classified exactly once per scan as either
//! [`ColumnKind::Numeric`] or [`ColumnKind::Categorical`]. Numeric columns
//! feed the z-score, IQR and time-series detectors; categorical columns feed
//! the frequency detector.
//!
//! # Example
//!
//! ```rust
//! use term_scan::analyzers::inference::{ColumnClassifier, ColumnKind};
//! use term_scan::dataset::Dataset;
//!
//! let dataset = Dataset::from_rows(
//!     ["region", "sales"],
//!     vec![vec!["north", "10"], vec!["south", "12.5"]],
//! )
//! .unwrap();
//!
//! let classification = ColumnClassifier::new().classify_dataset(&dataset);
//! assert_eq!(classification.kind("region"), Some(ColumnKind::Categorical));
//! assert_eq!(classification.kind("sales"), Some(ColumnKind::Numeric));
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::dataset::{Column, Dataset, Value};

/// The two column kinds the detectors distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// All non-missing values are numbers.
    Numeric,
    /// At least one non-missing value is not a number.
    Categorical,
}

impl ColumnKind {
    /// Get the kind name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "Numeric",
            ColumnKind::Categorical => "Categorical",
        }
    }
}

/// Per-column value tallies gathered while classifying.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    pub total_values: usize,
    pub missing_count: usize,
    pub numeric_count: usize,
}

impl ColumnStats {
    fn collect(column: &Column) -> Self {
        column
            .values()
            .iter()
            .fold(Self::default(), |mut stats, value| {
                stats.total_values += 1;
                match value {
                    Value::Missing => stats.missing_count += 1,
                    other if other.as_f64().is_some() => stats.numeric_count += 1,
                    _ => {}
                }
                stats
            })
    }

    /// Number of non-missing values that are not numbers.
    pub fn non_numeric_count(&self) -> usize {
        self.total_values - self.missing_count - self.numeric_count
    }
}

/// Classification of every column of a dataset, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    columns: Vec<(String, ColumnKind)>,
}

impl ColumnClassification {
    /// The kind of the named column, if the column exists.
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, kind)| *kind)
    }

    /// All `(column, kind)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Names of the numeric columns, in declared order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Numeric)
    }

    /// Names of the categorical columns, in declared order.
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Categorical)
    }

    /// Names of the columns of the given kind, in declared order.
    pub fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Classifies columns as numeric or categorical.
#[derive(Debug, Default, Clone)]
pub struct ColumnClassifier;

impl ColumnClassifier {
    /// Creates a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classifies a single column.
    ///
    /// A column is numeric when every non-missing value reads as a number.
    /// Missing values never affect the outcome, so a column with no values at
    /// all is numeric.
    pub fn classify(&self, column: &Column) -> ColumnKind {
        let stats = ColumnStats::collect(column);
        let kind = if stats.non_numeric_count() == 0 {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };

        debug!(
            column = column.name(),
            kind = kind.type_name(),
            missing = stats.missing_count,
            numeric = stats.numeric_count,
            "Classified column"
        );
        kind
    }

    /// Classifies every column of the dataset once.
    #[instrument(skip(self, dataset), fields(columns = dataset.column_count()))]
    pub fn classify_dataset(&self, dataset: &Dataset) -> ColumnClassification {
        ColumnClassification {
            columns: dataset
                .columns()
                .iter()
                .map(|column| (column.name().to_string(), self.classify(column)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: Vec<Value>) -> Column {
        Column::new("c", values)
    }

    #[test]
    fn test_numeric_column() {
        let classifier = ColumnClassifier::new();
        let kind = classifier.classify(&column(vec![
            Value::Number(1.0),
            Value::Missing,
            Value::Text("2.5".to_string()),
        ]));
        assert_eq!(kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_single_text_value_makes_column_categorical() {
        let classifier = ColumnClassifier::new();
        let kind = classifier.classify(&column(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Text("n/a".to_string()),
        ]));
        assert_eq!(kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_missing_values_do_not_affect_classification() {
        let classifier = ColumnClassifier::new();
        assert_eq!(
            classifier.classify(&column(vec![Value::Missing, Value::Missing])),
            ColumnKind::Numeric
        );
        assert_eq!(
            classifier.classify(&column(vec![Value::Missing, Value::Text("a".into())])),
            ColumnKind::Categorical
        );
    }

    #[test]
    fn test_classify_dataset_preserves_order() {
        let dataset = Dataset::builder()
            .column("id", [1.0, 2.0])
            .column("city", ["Oslo", "Rome"])
            .column("score", [0.5, 0.7])
            .build()
            .unwrap();

        let classification = ColumnClassifier::new().classify_dataset(&dataset);
        assert_eq!(classification.numeric_columns(), vec!["id", "score"]);
        assert_eq!(classification.categorical_columns(), vec!["city"]);
        assert_eq!(classification.kind("missing"), None);
    }

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::collect(&column(vec![
            Value::Number(1.0),
            Value::Missing,
            Value::Text("x".to_string()),
        ]));
        assert_eq!(stats.total_values, 3);
        assert_eq!(stats.missing_count, 1);
        assert_eq!(stats.numeric_count, 1);
        assert_eq!(stats.non_numeric_count(), 1);
    }
}
