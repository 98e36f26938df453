//! Term Scan CLI
//!
//! Detects anomalies in a CSV file using multiple statistical methods and
//! prints a summary, optionally saving the full report as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use term_scan::analyzers::{AnomalyScanRunner, DetectionConfig, DetectionMethod};
use term_scan::formatters::{
    FormatterConfig, HumanFormatter, JsonFormatter, MarkdownFormatter, ReportFormatter,
};
use term_scan::logging::setup::{init_logging, LoggingConfig};
use term_scan::logging::LogConfig;
use term_scan::sources::CsvSource;
use tracing::Level;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

/// Detect anomalies in CSV data using multiple statistical methods
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to input CSV file
    input: PathBuf,

    /// Comma-separated detection methods: zscore, iqr, timeseries, frequency
    #[arg(long, default_value = "zscore,iqr")]
    methods: String,

    /// Z-score threshold for anomaly detection
    #[arg(long, default_value_t = 3.0)]
    threshold: f64,

    /// Date column name for time-series analysis
    #[arg(long)]
    date_column: Option<String>,

    /// Output JSON file path for detailed results
    #[arg(long)]
    output: Option<PathBuf>,

    /// Console output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Maximum number of high severity anomalies to show
    #[arg(long, default_value_t = 5)]
    max_highlights: usize,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging =
        LoggingConfig::default().with_json_format(matches!(args.log_format, LogFormat::Json));
    if args.verbose {
        logging = logging.with_scan_level(Level::DEBUG);
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let methods = DetectionMethod::parse_list(&args.methods)?;
    let config = DetectionConfig::builder()
        .methods(methods)
        .threshold(args.threshold)
        .maybe_date_column(args.date_column.clone())
        .build()?;

    println!("Loading data from {}...", args.input.display());
    let dataset = CsvSource::new(&args.input)
        .load()
        .await
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    println!(
        "Dataset shape: ({}, {})",
        dataset.row_count(),
        dataset.column_count()
    );
    println!("Columns: {:?}\n", dataset.column_names());

    let log_config = if args.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let report = AnomalyScanRunner::new(config)
        .with_log_config(log_config)
        .run(&dataset)?;

    let formatter_config = FormatterConfig::default().with_max_highlights(args.max_highlights);
    let rendered = match args.format {
        OutputFormat::Human => HumanFormatter::with_config(formatter_config).format(&report)?,
        OutputFormat::Json => JsonFormatter::with_config(formatter_config).format(&report)?,
        OutputFormat::Markdown => {
            MarkdownFormatter::with_config(formatter_config).format(&report)?
        }
    };
    print!("{rendered}");

    if let Some(output) = &args.output {
        report.save_json(output)?;
        println!("\nResults saved to {}", output.display());
    }

    Ok(())
}
