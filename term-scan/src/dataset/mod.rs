//! In-memory tabular dataset scanned by the detectors.
//!
//! A [`Dataset`] is stored column-major: each [`Column`] keeps its values in
//! original row order, so the position of a value inside `Column::values` is
//! its row index in the source file. Detectors never compact these vectors;
//! when they drop missing values they carry the original index along with the
//! value (see [`Column::numeric_values`]).

mod record_batch;

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TermError};

static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("numeric literal pattern")
});

/// A single cell of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A numeric cell.
    Number(f64),
    /// A textual cell.
    Text(String),
    /// An empty or null cell.
    Missing,
}

impl Value {
    /// Creates a numeric value, mapping NaN to [`Value::Missing`].
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            Value::Missing
        } else {
            Value::Number(value)
        }
    }

    /// Creates a value from a raw text cell.
    ///
    /// Empty cells become [`Value::Missing`]; everything else is kept as text.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Value::Missing
        } else {
            Value::Text(value)
        }
    }

    /// Parses a raw cell, producing a number when the text is a numeric literal.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Missing
        } else if NUMERIC_LITERAL.is_match(trimmed) {
            trimmed
                .parse::<f64>()
                .map(Value::number)
                .unwrap_or_else(|_| Value::Text(raw.to_string()))
        } else {
            Value::Text(raw.to_string())
        }
    }

    /// Returns true for missing cells.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Returns the numeric reading of this value, if it has one.
    ///
    /// Text cells holding a numeric literal are read as numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(s) => {
                let trimmed = s.trim();
                if NUMERIC_LITERAL.is_match(trimmed) {
                    trimmed.parse().ok()
                } else {
                    None
                }
            }
            Value::Missing => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(""),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// A named column with values in original row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// The column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All values, indexed by original row.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of rows in the column, including missing cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `(row_index, value)` for every non-missing numeric cell.
    ///
    /// Row indices refer to the original dataset, not to the filtered sequence.
    pub fn numeric_values(&self) -> Vec<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(row, value)| value.as_f64().map(|v| (row, v)))
            .collect()
    }

    /// Turns text cells matching one of `markers` into [`Value::Missing`].
    ///
    /// When at least one cell was replaced and every remaining cell is a
    /// numeric literal, the column is re-read as numbers. Returns the number
    /// of replaced cells.
    fn mask_missing_markers(&mut self, markers: &HashSet<&str>) -> usize {
        let mut masked = 0;
        for value in &mut self.values {
            if let Value::Text(text) = value {
                if markers.contains(text.trim()) {
                    *value = Value::Missing;
                    masked += 1;
                }
            }
        }

        let all_numeric = self
            .values
            .iter()
            .all(|value| value.is_missing() || value.as_f64().is_some());
        if masked > 0 && all_numeric {
            for value in &mut self.values {
                if let Some(number) = value.as_f64() {
                    *value = Value::number(number);
                }
            }
        }
        masked
    }
}

/// An ordered collection of equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Creates a builder for assembling a dataset column by column.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Builds a dataset from row-major text records.
    ///
    /// Every cell goes through [`Value::parse`]. Rows shorter than the header
    /// are padded with missing cells; longer rows are rejected.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Result<Self>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let names: Vec<String> = headers.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

        for (row_index, row) in rows.into_iter().enumerate() {
            let mut width = 0;
            for (col_index, cell) in row.into_iter().enumerate() {
                let column = columns.get_mut(col_index).ok_or_else(|| {
                    TermError::Parse(format!(
                        "row {row_index} has more fields than the {} declared columns",
                        names.len()
                    ))
                })?;
                column.push(Value::parse(cell.as_ref()));
                width = col_index + 1;
            }
            for column in columns.iter_mut().skip(width) {
                column.push(Value::Missing);
            }
        }

        names
            .into_iter()
            .zip(columns)
            .fold(Dataset::builder(), |builder, (name, values)| {
                builder.column(name, values)
            })
            .build()
    }

    /// Columns in declared order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column by name, failing when it does not exist.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| TermError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    /// Treats text cells equal to any of `markers` as missing values.
    ///
    /// Surrounding whitespace is ignored when comparing. A column whose only
    /// non-numeric cells were markers becomes a column of numbers.
    pub fn mask_missing_markers<S: AsRef<str>>(&mut self, markers: &[S]) -> usize {
        let markers: HashSet<&str> = markers.iter().map(|m| m.as_ref()).collect();
        if markers.is_empty() {
            return 0;
        }
        self.columns
            .iter_mut()
            .map(|column| column.mask_missing_markers(&markers))
            .sum()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the value at `(column, row)` in the original dataset.
    pub fn value(&self, column: &str, row: usize) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Returns an ordered `(column name, value)` view of one row.
    pub fn row(&self, index: usize) -> Option<Vec<(&str, &Value)>> {
        if index >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name(), &c.values[index]))
                .collect(),
        )
    }
}

/// Builder for [`Dataset`].
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Column>,
}

impl DatasetBuilder {
    /// Appends a column.
    pub fn column<V>(mut self, name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        self.columns.push(Column::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Validates column names and lengths and builds the dataset.
    pub fn build(self) -> Result<Dataset> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TermError::Parse(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        let row_count = self.columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = self.columns.iter().find(|c| c.len() != row_count) {
            return Err(TermError::Parse(format!(
                "column '{}' has {} rows, expected {row_count}",
                bad.name,
                bad.len()
            )));
        }

        Ok(Dataset {
            columns: self.columns,
            row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse("42"), Value::Number(42.0));
        assert_eq!(Value::parse(" -1.5e3 "), Value::Number(-1500.0));
        assert_eq!(Value::parse(".5"), Value::Number(0.5));
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse("   "), Value::Missing);
        assert_eq!(Value::parse("north"), Value::Text("north".to_string()));
        assert_eq!(Value::parse("2024-01-01"), Value::Text("2024-01-01".to_string()));
        assert_eq!(Value::parse("nan"), Value::Text("nan".to_string()));
    }

    #[test]
    fn test_value_number_maps_nan_to_missing() {
        assert_eq!(Value::number(f64::NAN), Value::Missing);
        assert_eq!(Value::from(Some(2.0)), Value::Number(2.0));
        assert_eq!(Value::from(None::<f64>), Value::Missing);
    }

    #[test]
    fn test_numeric_values_keep_original_rows() {
        let column = Column::new(
            "amount",
            vec![
                Value::Number(1.0),
                Value::Missing,
                Value::Text("3".to_string()),
                Value::Missing,
                Value::Number(5.0),
            ],
        );
        assert_eq!(column.numeric_values(), vec![(0, 1.0), (2, 3.0), (4, 5.0)]);
    }

    #[test]
    fn test_builder_rejects_ragged_columns() {
        let err = Dataset::builder()
            .column("a", [1.0, 2.0])
            .column("b", [1.0])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("column 'b' has 1 rows"));
    }

    #[test]
    fn test_builder_rejects_duplicate_names() {
        let err = Dataset::builder()
            .column("a", [1.0])
            .column("a", [2.0])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'a'"));
    }

    #[test]
    fn test_from_rows() {
        let dataset = Dataset::from_rows(
            ["region", "sales"],
            vec![vec!["north", "10"], vec!["south", ""], vec!["east"]],
        )
        .unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.value("sales", 0), Some(&Value::Number(10.0)));
        assert_eq!(dataset.value("sales", 1), Some(&Value::Missing));
        assert_eq!(dataset.value("sales", 2), Some(&Value::Missing));
        assert_eq!(
            dataset.row(0).unwrap(),
            vec![
                ("region", &Value::Text("north".to_string())),
                ("sales", &Value::Number(10.0))
            ]
        );
        assert!(dataset.row(3).is_none());
    }

    #[test]
    fn test_from_rows_rejects_wide_rows() {
        let result = Dataset::from_rows(["a"], vec![vec!["1", "2"]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_require_column() {
        let dataset = Dataset::builder().column("a", [1.0]).build().unwrap();
        assert!(dataset.require_column("a").is_ok());
        assert!(matches!(
            dataset.require_column("b"),
            Err(TermError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_mask_missing_markers() {
        let mut dataset = Dataset::builder()
            .column("x", ["1", "NA", " 3 ", "null"])
            .column("city", ["Paris", "N/A", "Lyon", "NA"])
            .build()
            .unwrap();

        let masked = dataset.mask_missing_markers(&["NA", "N/A", "null"]);

        assert_eq!(masked, 4);
        assert_eq!(
            dataset.column("x").unwrap().values(),
            &[
                Value::Number(1.0),
                Value::Missing,
                Value::Number(3.0),
                Value::Missing
            ]
        );
        assert_eq!(dataset.value("city", 0), Some(&Value::Text("Paris".to_string())));
        assert_eq!(dataset.value("city", 1), Some(&Value::Missing));
    }

    #[test]
    fn test_mask_missing_markers_keeps_unmarked_columns() {
        let mut dataset = Dataset::builder()
            .column("code", ["007", "010"])
            .build()
            .unwrap();
        assert_eq!(dataset.mask_missing_markers::<&str>(&[]), 0);
        assert_eq!(dataset.mask_missing_markers(&["NA"]), 0);
        assert_eq!(dataset.value("code", 0), Some(&Value::Text("007".to_string())));
    }
}
