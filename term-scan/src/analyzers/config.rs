//! Detection request and detector tunables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TermError};

/// The four detection methods.
///
/// Variants are declared in execution order; [`DetectionConfig`] always runs
/// the requested methods in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DetectionMethod {
    /// Standardized deviation from the column mean.
    #[serde(rename = "z-score")]
    ZScore,
    /// Quartile-derived fences.
    #[serde(rename = "IQR")]
    Iqr,
    /// Centered rolling statistics over daily aggregates.
    #[serde(rename = "time-series")]
    TimeSeries,
    /// Rare categorical values.
    #[serde(rename = "frequency")]
    Frequency,
}

impl DetectionMethod {
    /// All methods in execution order.
    pub const ALL: [DetectionMethod; 4] = [
        DetectionMethod::ZScore,
        DetectionMethod::Iqr,
        DetectionMethod::TimeSeries,
        DetectionMethod::Frequency,
    ];

    /// The tag used in anomaly records.
    pub fn tag(&self) -> &'static str {
        match self {
            DetectionMethod::ZScore => "z-score",
            DetectionMethod::Iqr => "IQR",
            DetectionMethod::TimeSeries => "time-series",
            DetectionMethod::Frequency => "frequency",
        }
    }

    /// The name accepted on the command line.
    pub fn cli_name(&self) -> &'static str {
        match self {
            DetectionMethod::ZScore => "zscore",
            DetectionMethod::Iqr => "iqr",
            DetectionMethod::TimeSeries => "timeseries",
            DetectionMethod::Frequency => "frequency",
        }
    }

    /// Parses a comma-separated method list such as `"zscore,iqr"`.
    pub fn parse_list(list: &str) -> Result<Vec<DetectionMethod>> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(DetectionMethod::from_str)
            .collect()
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DetectionMethod {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zscore" | "z-score" => Ok(DetectionMethod::ZScore),
            "iqr" => Ok(DetectionMethod::Iqr),
            "timeseries" | "time-series" => Ok(DetectionMethod::TimeSeries),
            "frequency" => Ok(DetectionMethod::Frequency),
            other => Err(TermError::configuration(format!(
                "unknown detection method '{other}' (expected one of: zscore, iqr, timeseries, frequency)"
            ))),
        }
    }
}

/// Configuration for an anomaly scan.
///
/// Holds the detection request (methods, threshold, date column) along with
/// the constants each detector uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Requested methods, deduplicated and in execution order.
    pub methods: Vec<DetectionMethod>,
    /// Z threshold used by the z-score and time-series detectors.
    pub threshold: f64,
    /// Date column required by the time-series detector.
    pub date_column: Option<String>,
    /// Z value above which a z-based anomaly is high severity.
    pub high_severity_z: f64,
    /// Fence width in IQR units.
    pub iqr_multiplier: f64,
    /// Distance beyond the nearer fence, in IQR units, that makes an IQR anomaly high severity.
    pub iqr_high_severity_factor: f64,
    /// Upper bound on the rolling window size.
    pub max_window: usize,
    /// Minimum number of daily aggregates for time-series detection.
    pub min_aggregate_points: usize,
    /// Frequencies strictly below this are rare.
    pub rare_frequency: f64,
    /// Counts strictly below this are rare.
    pub rare_max_count: usize,
    /// Whether missing categorical cells form their own frequency bucket.
    pub count_missing_as_category: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            methods: vec![DetectionMethod::ZScore, DetectionMethod::Iqr],
            threshold: 3.0,
            date_column: None,
            high_severity_z: 4.0,
            iqr_multiplier: 1.5,
            iqr_high_severity_factor: 2.0,
            max_window: 7,
            min_aggregate_points: 7,
            rare_frequency: 0.01,
            rare_max_count: 10,
            count_missing_as_category: true,
        }
    }
}

impl DetectionConfig {
    /// Creates a builder starting from the default configuration.
    pub fn builder() -> DetectionConfigBuilder {
        DetectionConfigBuilder {
            config: DetectionConfig::default(),
        }
    }

    /// Returns true when `method` was requested.
    pub fn runs(&self, method: DetectionMethod) -> bool {
        self.methods.contains(&method)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(TermError::configuration(format!(
                "threshold must be finite, got: {}",
                self.threshold
            )));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(TermError::configuration(format!(
                "iqr_multiplier must be finite and non-negative, got: {}",
                self.iqr_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.rare_frequency) {
            return Err(TermError::configuration(format!(
                "rare_frequency must lie in [0, 1], got: {}",
                self.rare_frequency
            )));
        }
        if self.max_window < 2 {
            return Err(TermError::configuration(format!(
                "max_window must be at least 2, got: {}",
                self.max_window
            )));
        }
        Ok(())
    }
}

/// Builder for [`DetectionConfig`].
#[derive(Debug, Clone)]
pub struct DetectionConfigBuilder {
    config: DetectionConfig,
}

impl DetectionConfigBuilder {
    /// Sets the methods to run. Duplicates are dropped and the canonical
    /// execution order is restored.
    pub fn methods(mut self, methods: impl IntoIterator<Item = DetectionMethod>) -> Self {
        let mut methods: Vec<DetectionMethod> = methods.into_iter().collect();
        methods.sort();
        methods.dedup();
        self.config.methods = methods;
        self
    }

    /// Sets the z threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Sets the date column used for time-series detection.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.config.date_column = Some(column.into());
        self
    }

    /// Sets the date column from an optional value.
    pub fn maybe_date_column(mut self, column: Option<String>) -> Self {
        self.config.date_column = column;
        self
    }

    /// Sets the fence width in IQR units.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.config.iqr_multiplier = multiplier;
        self
    }

    /// Sets the rarity thresholds of the frequency detector.
    pub fn rare_thresholds(mut self, frequency: f64, max_count: usize) -> Self {
        self.config.rare_frequency = frequency;
        self.config.rare_max_count = max_count;
        self
    }

    /// Sets whether missing categorical cells are counted as a category.
    pub fn count_missing_as_category(mut self, enabled: bool) -> Self {
        self.config.count_missing_as_category = enabled;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<DetectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(
            config.methods,
            vec![DetectionMethod::ZScore, DetectionMethod::Iqr]
        );
        assert_eq!(config.threshold, 3.0);
        assert!(config.date_column.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_list() {
        let methods = DetectionMethod::parse_list(" zscore, IQR ,timeseries,frequency,").unwrap();
        assert_eq!(methods, DetectionMethod::ALL.to_vec());

        let err = DetectionMethod::parse_list("zscore,median").unwrap_err();
        assert!(err.to_string().contains("unknown detection method 'median'"));
    }

    #[test]
    fn test_builder_orders_and_dedups_methods() {
        let config = DetectionConfig::builder()
            .methods([
                DetectionMethod::Frequency,
                DetectionMethod::ZScore,
                DetectionMethod::Frequency,
            ])
            .build()
            .unwrap();
        assert_eq!(
            config.methods,
            vec![DetectionMethod::ZScore, DetectionMethod::Frequency]
        );
        assert!(config.runs(DetectionMethod::Frequency));
        assert!(!config.runs(DetectionMethod::Iqr));
    }

    #[test]
    fn test_builder_accepts_only_finite_threshold() {
        assert!(DetectionConfig::builder().threshold(0.0).build().is_ok());
        assert!(DetectionConfig::builder()
            .threshold(f64::NAN)
            .build()
            .is_err());
        assert!(DetectionConfig::builder()
            .threshold(f64::INFINITY)
            .build()
            .is_err());
    }

    #[test]
    fn test_method_names() {
        for method in DetectionMethod::ALL {
            assert_eq!(method.cli_name().parse::<DetectionMethod>().unwrap(), method);
            assert_eq!(method.tag().parse::<DetectionMethod>().unwrap(), method);
        }
        assert_eq!(
            serde_json::to_string(&DetectionMethod::Iqr).unwrap(),
            "\"IQR\""
        );
    }
}
