//! CSV file source backed by DataFusion.

use std::path::{Path, PathBuf};

use datafusion::prelude::*;
use tracing::{debug, info, instrument};

use crate::dataset::Dataset;
use crate::prelude::*;

/// Options for configuring CSV file reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Escape character (default: None)
    pub escape: Option<u8>,
    /// Comment prefix (lines starting with this are ignored)
    pub comment: Option<u8>,
    /// Maximum records to read for schema inference
    pub schema_infer_max_records: usize,
    /// Cell spellings read as missing values, in addition to empty cells
    pub null_values: Vec<String>,
}

/// Cell spellings treated as missing by default.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            // Inspect every row so a late text value still makes the column categorical.
            schema_infer_max_records: usize::MAX,
            null_values: DEFAULT_NULL_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// A single CSV file loaded fully into memory.
///
/// # Examples
///
/// ```rust,no_run
/// use term_scan::sources::{CsvOptions, CsvSource};
///
/// # async fn example() -> term_scan::error::Result<()> {
/// let dataset = CsvSource::new("data/sales.csv").load().await?;
/// println!("{} rows", dataset.row_count());
///
/// let options = CsvOptions {
///     delimiter: b'\t',
///     ..Default::default()
/// };
/// let dataset = CsvSource::with_options("data/sales.tsv", options).load().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source with default options.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the reader options.
    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// Returns a short description of this source.
    pub fn description(&self) -> String {
        format!("CSV file: {}", self.path.display())
    }

    /// Reads the whole file into a [`Dataset`].
    ///
    /// Column types are inferred by DataFusion: numeric columns become
    /// numbers, everything else is kept as text. Cells spelled like one of
    /// [`CsvOptions::null_values`] are read as missing, and a text column
    /// holding only numbers and such markers is read as numbers.
    ///
    /// The file is scanned as a single partition so that record batches
    /// arrive in file order and row indices match the file.
    #[instrument(skip(self), fields(
        source.type = "csv",
        source.path = %self.path.display(),
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    pub async fn load(&self) -> Result<Dataset> {
        if !self.path.is_file() {
            return Err(TermError::data_source(
                "CSV",
                format!("File not found: {}", self.path.display()),
            ));
        }
        let path = self.path.to_str().ok_or_else(|| {
            TermError::Configuration(format!(
                "Path contains invalid UTF-8: {}",
                self.path.display()
            ))
        })?;

        info!(source.path = %path, "Loading CSV data source");

        let extension = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema_infer_max_records(self.options.schema_infer_max_records)
            .file_extension(&extension);
        if let Some(escape) = self.options.escape {
            csv_options = csv_options.escape(escape);
        }
        if let Some(comment) = self.options.comment {
            csv_options = csv_options.comment(comment);
        }

        let config = SessionConfig::new()
            .with_target_partitions(1)
            .with_repartition_file_scans(false);
        let ctx = SessionContext::new_with_config(config);
        let df = ctx.read_csv(path, csv_options).await.map_err(|e| {
            TermError::data_source_with_source("CSV", format!("Failed to read {path}"), Box::new(e))
        })?;
        let schema = df.schema().inner().clone();
        let batches = df.collect().await?;

        let mut dataset = Dataset::from_record_batches(schema, &batches)?;
        let masked = dataset.mask_missing_markers(&self.options.null_values);
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            batches = batches.len(),
            missing_markers = masked,
            "CSV data source loaded"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_csv_source_with_options() {
        let options = CsvOptions {
            delimiter: b'\t',
            has_header: false,
            ..Default::default()
        };
        let source = CsvSource::with_options("data.tsv", options);
        assert_eq!(source.options().delimiter, b'\t');
        assert!(!source.options().has_header);
        assert!(source.description().contains("data.tsv"));
    }

    #[tokio::test]
    async fn test_load_simple_file() {
        let file = create_test_csv("id,name,age\n1,Alice,30\n2,Bob,\n3,Charlie,35\n", ".csv");
        let dataset = CsvSource::new(file.path()).load().await.unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_names(), vec!["id", "name", "age"]);
        assert_eq!(dataset.value("age", 0), Some(&Value::Number(30.0)));
        assert_eq!(dataset.value("age", 1), Some(&Value::Missing));
        assert_eq!(
            dataset.value("name", 2),
            Some(&Value::Text("Charlie".to_string()))
        );
    }

    #[tokio::test]
    async fn test_load_reads_missing_markers() {
        let mut contents = String::from("x,label\n");
        for _ in 0..30 {
            contents.push_str("1,a\n");
        }
        contents.push_str("NA,N/A\n100,b\n");
        let file = create_test_csv(&contents, ".csv");

        let dataset = CsvSource::new(file.path()).load().await.unwrap();

        assert_eq!(dataset.value("x", 30), Some(&Value::Missing));
        assert_eq!(dataset.value("x", 31), Some(&Value::Number(100.0)));
        assert_eq!(dataset.value("label", 30), Some(&Value::Missing));
        assert_eq!(dataset.value("label", 31), Some(&Value::Text("b".to_string())));
    }

    #[tokio::test]
    async fn test_load_without_null_values_keeps_markers() {
        let file = create_test_csv("x\n1\nNA\n", ".csv");
        let options = CsvOptions {
            null_values: Vec::new(),
            ..Default::default()
        };
        let dataset = CsvSource::with_options(file.path(), options)
            .load()
            .await
            .unwrap();
        assert_eq!(dataset.value("x", 1), Some(&Value::Text("NA".to_string())));
    }

    #[tokio::test]
    async fn test_load_tab_separated_file() {
        let file = create_test_csv("a\tb\n1\tx\n2\ty\n", ".tsv");
        let options = CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        };
        let dataset = CsvSource::with_options(file.path(), options)
            .load()
            .await
            .unwrap();
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.value("b", 1), Some(&Value::Text("y".to_string())));
    }

    #[tokio::test]
    async fn test_missing_file_is_data_source_error() {
        let err = CsvSource::new("/definitely/not/here.csv")
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, TermError::DataSource { ref source_type, .. } if source_type == "CSV"));
    }
}
