//! Logging utilities and configuration for the anomaly scanner.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. [`setup::init_logging`] does that for the CLI.

/// Runtime logging knobs used by the library itself.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether to log every anomaly as it is found
    pub log_column_details: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_column_details: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            log_column_details: true,
            max_field_length: 1024,
        }
    }

    /// Creates a quiet configuration for production.
    pub fn production() -> Self {
        Self {
            log_column_details: false,
            max_field_length: 128,
        }
    }
}

/// Logs per-anomaly details at debug level when enabled in the [`LogConfig`].
#[macro_export]
macro_rules! log_column_detail {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_column_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, respecting character
/// boundaries.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber installation for binaries.
pub mod setup {
    use tracing::Level;

    /// Configuration for the scanner's logging setup.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside the scanner
        pub level: Level,
        /// Log level for `term_scan` targets
        pub scan_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                scan_level: Level::INFO,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                scan_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::INFO,
                scan_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level outside the scanner.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for scanner components.
        pub fn with_scan_level(mut self, level: Level) -> Self {
            self.scan_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            match self.env_filter {
                Some(ref filter) => filter.clone(),
                None => format!(
                    "{},term_scan={}",
                    self.level.as_str().to_lowercase(),
                    self.scan_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Events are
    /// written to stderr so that report output on stdout stays clean.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_scan::logging::setup::{init_logging, LoggingConfig};
    ///
    /// let config = LoggingConfig::development().with_json_format(true);
    /// init_logging(config).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
