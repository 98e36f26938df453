//! Report formatting for the anomaly scanner.
//!
//! This module renders an [`AnomalyReport`] as human-readable console text,
//! JSON, or Markdown.
//!
//! # Examples
//!
//! ```rust
//! use term_scan::analyzers::AnomalyReport;
//! use term_scan::formatters::{HumanFormatter, ReportFormatter};
//!
//! let report = AnomalyReport::new(Vec::new(), &[], 0, 0, 0);
//! let output = HumanFormatter::new().format(&report).unwrap();
//! assert!(output.contains("ANOMALY DETECTION SUMMARY"));
//! ```

use std::fmt::Write;

use crate::analyzers::{Anomaly, AnomalyReport, Severity};
use crate::prelude::*;

const RULE_WIDTH: usize = 60;

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Maximum number of high-severity anomalies to highlight
    pub max_highlights: usize,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the full anomaly list (JSON and Markdown)
    pub include_anomalies: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_highlights: 5,
            use_colors: false,
            include_anomalies: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the summary.
    pub fn minimal() -> Self {
        Self {
            max_highlights: 0,
            use_colors: false,
            include_anomalies: false,
        }
    }

    /// Creates a detailed configuration showing everything.
    pub fn detailed() -> Self {
        Self {
            max_highlights: usize::MAX,
            use_colors: true,
            include_anomalies: true,
        }
    }

    /// Creates a configuration suitable for CI environments.
    pub fn ci() -> Self {
        Self {
            max_highlights: 20,
            use_colors: false,
            include_anomalies: true,
        }
    }

    /// Sets the maximum number of highlighted anomalies.
    pub fn with_max_highlights(mut self, max: usize) -> Self {
        self.max_highlights = max;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Sets whether to include the full anomaly list.
    pub fn with_anomalies(mut self, include: bool) -> Self {
        self.include_anomalies = include;
        self
    }
}

/// Trait for rendering an anomaly report.
pub trait ReportFormatter {
    /// Formats a report into a string representation.
    fn format(&self, report: &AnomalyReport) -> Result<String>;

    /// Formats a report with an explicit configuration.
    fn format_with_config(
        &self,
        report: &AnomalyReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

/// Formats reports as JSON with 2-space indentation.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &AnomalyReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &AnomalyReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let filtered;
        let report = if config.include_anomalies {
            report
        } else {
            filtered = AnomalyReport {
                anomalies: Vec::new(),
                ..report.clone()
            };
            &filtered
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        json.map_err(|e| {
            TermError::Serialization(format!("Failed to serialize report to JSON: {e}"))
        })
    }
}

/// Formats reports for the console.
///
/// Prints dataset statistics, severity counts, the anomaly rate and the first
/// few high-severity anomalies with all their fields.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn paint(text: &str, color: &str, config: &FormatterConfig) -> String {
        if config.use_colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &AnomalyReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &AnomalyReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;
        let stats = &report.statistics;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(output).ok();
        writeln!(output, "{rule}").ok();
        writeln!(output, "ANOMALY DETECTION SUMMARY").ok();
        writeln!(output, "{rule}").ok();

        writeln!(output).ok();
        writeln!(output, "Dataset Statistics:").ok();
        writeln!(output, "  Total rows: {}", stats.dataset_rows).ok();
        writeln!(output, "  Total columns: {}", stats.dataset_columns).ok();
        writeln!(output, "  Numeric columns: {}", stats.numeric_columns).ok();

        writeln!(output).ok();
        writeln!(output, "Anomaly Summary:").ok();
        writeln!(output, "  Total anomalies: {}", summary.total_anomalies).ok();
        writeln!(
            output,
            "  High severity: {}",
            Self::paint(&summary.high_severity.to_string(), "31", config)
        )
        .ok();
        writeln!(
            output,
            "  Medium severity: {}",
            Self::paint(&summary.medium_severity.to_string(), "33", config)
        )
        .ok();
        writeln!(
            output,
            "  Low severity: {}",
            Self::paint(&summary.low_severity.to_string(), "34", config)
        )
        .ok();
        writeln!(output, "  Anomaly rate: {:.2}%", stats.anomaly_percentage).ok();

        let highlights: Vec<&Anomaly> = report
            .by_severity(Severity::High)
            .take(config.max_highlights)
            .collect();
        if !highlights.is_empty() {
            writeln!(output).ok();
            writeln!(
                output,
                "Top High Severity Anomalies (showing up to {}):",
                config.max_highlights
            )
            .ok();
            for (i, anomaly) in highlights.iter().enumerate() {
                writeln!(output).ok();
                writeln!(
                    output,
                    "  {}. {} method",
                    i + 1,
                    anomaly.method.tag().to_uppercase()
                )
                .ok();
                for (key, value) in anomaly.fields() {
                    writeln!(output, "     {key}: {value}").ok();
                }
            }

            let remaining = report.by_severity(Severity::High).count() - highlights.len();
            if remaining > 0 {
                writeln!(output).ok();
                writeln!(
                    output,
                    "  ... and {remaining} more high severity anomalies (use --max-highlights to show more)"
                )
                .ok();
            }
        }

        Ok(output)
    }
}

/// Formats reports as Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &AnomalyReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &AnomalyReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        let h = "#".repeat(self.heading_level as usize);
        let summary = &report.summary;
        let stats = &report.statistics;

        writeln!(output, "{h} Anomaly Detection Report").ok();
        writeln!(output).ok();
        writeln!(output, "**Methods:** {}", summary.methods_used.join(", ")).ok();

        writeln!(output).ok();
        writeln!(output, "{h}# Summary").ok();
        writeln!(output).ok();
        writeln!(output, "| Metric | Value |").ok();
        writeln!(output, "|--------|-------|").ok();
        writeln!(output, "| Rows | {} |", stats.dataset_rows).ok();
        writeln!(output, "| Columns | {} |", stats.dataset_columns).ok();
        writeln!(output, "| Numeric Columns | {} |", stats.numeric_columns).ok();
        writeln!(output, "| Total Anomalies | {} |", summary.total_anomalies).ok();
        writeln!(output, "| High Severity | {} |", summary.high_severity).ok();
        writeln!(output, "| Medium Severity | {} |", summary.medium_severity).ok();
        writeln!(output, "| Low Severity | {} |", summary.low_severity).ok();
        writeln!(output, "| Anomaly Rate | {:.2}% |", stats.anomaly_percentage).ok();

        if config.include_anomalies && !report.anomalies.is_empty() {
            writeln!(output).ok();
            writeln!(output, "{h}# Anomalies").ok();
            writeln!(output).ok();
            writeln!(output, "| Method | Severity | Column | Details |").ok();
            writeln!(output, "|--------|----------|--------|---------|").ok();
            for anomaly in &report.anomalies {
                let details = anomaly
                    .fields()
                    .into_iter()
                    .filter(|(key, _)| *key != "column")
                    .map(|(key, value)| format!("{key}: {}", value.replace('|', "\\|")))
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(
                    output,
                    "| {} | {} | {} | {} |",
                    anomaly.method,
                    anomaly.severity,
                    anomaly.column.replace('|', "\\|"),
                    details
                )
                .ok();
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{AnomalyContext, DetectionMethod};

    fn create_test_report() -> AnomalyReport {
        let high = |row: usize| {
            Anomaly::new(
                DetectionMethod::ZScore,
                Severity::High,
                "amount",
                AnomalyContext::ZScore {
                    row,
                    value: 1000.0,
                    z_score: 9.5,
                },
            )
        };
        let mut anomalies: Vec<Anomaly> = (0..7).map(high).collect();
        anomalies.push(Anomaly::new(
            DetectionMethod::Frequency,
            Severity::Low,
            "city",
            AnomalyContext::Frequency {
                value: "Atlantis".to_string(),
                count: 1,
                frequency: 0.005,
            },
        ));
        AnomalyReport::new(
            anomalies,
            &[DetectionMethod::ZScore, DetectionMethod::Frequency],
            200,
            3,
            2,
        )
    }

    #[test]
    fn test_formatter_config() {
        let config = FormatterConfig::default();
        assert_eq!(config.max_highlights, 5);
        assert!(!config.use_colors);

        let minimal = FormatterConfig::minimal();
        assert_eq!(minimal.max_highlights, 0);
        assert!(!minimal.include_anomalies);

        assert!(!FormatterConfig::ci().use_colors);
        assert!(FormatterConfig::detailed().use_colors);
    }

    #[test]
    fn test_human_formatter() {
        let output = HumanFormatter::new().format(&create_test_report()).unwrap();

        assert!(output.contains("ANOMALY DETECTION SUMMARY"));
        assert!(output.contains("  Total rows: 200"));
        assert!(output.contains("  Numeric columns: 2"));
        assert!(output.contains("  High severity: 7"));
        assert!(output.contains("  Low severity: 1"));
        assert!(output.contains("  Anomaly rate: 4.00%"));
        assert!(output.contains("Top High Severity Anomalies (showing up to 5):"));
        assert!(output.contains("  1. Z-SCORE method"));
        assert!(output.contains("     row: 0"));
        assert!(output.contains("     z_score: 9.5"));
        assert!(output.contains("  5. Z-SCORE method"));
        assert!(!output.contains("  6. Z-SCORE method"));
        assert!(output.contains("... and 2 more high severity anomalies"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_human_formatter_colors_and_highlights() {
        let config = FormatterConfig::default()
            .with_colors(true)
            .with_max_highlights(0);
        let output = HumanFormatter::new()
            .format_with_config(&create_test_report(), &config)
            .unwrap();
        assert!(output.contains("\x1b[31m7\x1b[0m"));
        assert!(!output.contains("Top High Severity"));
    }

    #[test]
    fn test_human_formatter_header_shows_configured_cap() {
        let config = FormatterConfig::default().with_max_highlights(10);
        let output = HumanFormatter::new()
            .format_with_config(&create_test_report(), &config)
            .unwrap();
        assert!(output.contains("Top High Severity Anomalies (showing up to 10):"));
        assert!(output.contains("  7. Z-SCORE method"));
        assert!(!output.contains("more high severity anomalies"));
    }

    #[test]
    fn test_json_formatter() {
        let report = create_test_report();
        let output = JsonFormatter::new().format(&report).unwrap();
        assert!(output.contains("\"total_anomalies\": 8"));
        assert!(output.contains("\"value\": \"Atlantis\""));

        let output = JsonFormatter::with_config(FormatterConfig::minimal())
            .with_pretty(false)
            .format(&report)
            .unwrap();
        assert!(output.contains("\"anomalies\":[]"));
        assert!(output.contains("\"total_anomalies\":8"));
    }

    #[test]
    fn test_markdown_formatter() {
        let output = MarkdownFormatter::new().format(&create_test_report()).unwrap();
        assert!(output.contains("## Anomaly Detection Report"));
        assert!(output.contains("**Methods:** zscore, frequency"));
        assert!(output.contains("| Total Anomalies | 8 |"));
        assert!(output
            .contains("| frequency | low | city | value: Atlantis, count: 1, frequency: 0.005 |"));

        let output = MarkdownFormatter::new()
            .with_heading_level(1)
            .format(&create_test_report())
            .unwrap();
        assert!(output.starts_with("# Anomaly Detection Report"));
    }
}
