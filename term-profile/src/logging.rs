//! Logging utilities and configuration for feature profiling.
//!
//! Profiling emits one span per run plus optional per-column events. The
//! [`LogConfig`] switches control which of those events are produced, so a
//! production profile over wide tables stays quiet.

use tracing::Level;

/// Logging configuration for profile runs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for profiling components
    pub base_level: Level,
    /// Whether to log a debug event per profiled column
    pub log_column_details: bool,
    /// Whether to log dataset-level operations
    pub log_data_operations: bool,
    /// Maximum length for logged field values (to prevent huge logs)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_column_details: false,
            log_data_operations: true,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_column_details: true,
            log_data_operations: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_column_details: false,
            log_data_operations: false,
            max_field_length: 128,
        }
    }
}

/// Macro for performance-sensitive debug logging.
///
/// Arguments are only evaluated if the configured base level admits debug events.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional per-column logging.
#[macro_export]
macro_rules! log_column {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_column_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for conditional data operation logging.
#[macro_export]
macro_rules! log_data_op {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_data_operations {
            tracing::info!($($arg)*);
        }
    };
}

/// Truncates a string to at most `max_length` bytes, on a char boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let end = value
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_length)
        .last()
        .unwrap_or(0);
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for applications embedding the profiler.
pub mod setup {
    use tracing::Level;

    use crate::error::{ProfileError, Result};

    /// Configuration for the global tracing subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for this crate specifically
        pub profile_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                profile_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},term_profile={}",
                    self.level.as_str().to_lowercase(),
                    self.profile_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Installs a global fmt subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. Fails with
    /// [`ProfileError::Configuration`] when a global subscriber is already set.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_profile::logging::setup::{LoggingConfig, init_logging};
    ///
    /// let config = LoggingConfig {
    ///     json_format: true,
    ///     ..LoggingConfig::default()
    /// };
    /// init_logging(config).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| ProfileError::invalid_config(format!("cannot install subscriber: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::setup::LoggingConfig;
    use super::*;

    #[test]
    fn test_log_config_presets() {
        let config = LogConfig::default();
        assert_eq!(config.base_level, Level::INFO);
        assert!(!config.log_column_details);
        assert!(config.log_data_operations);
        assert_eq!(config.max_field_length, 256);

        let config = LogConfig::verbose();
        assert_eq!(config.base_level, Level::DEBUG);
        assert!(config.log_column_details);
        assert_eq!(config.max_field_length, 1024);

        let config = LogConfig::production();
        assert_eq!(config.base_level, Level::WARN);
        assert!(!config.log_column_details);
        assert!(!config.log_data_operations);
    }

    #[test]
    fn test_truncate_field() {
        assert_eq!(truncate_field("hello", 10), "hello");
        assert_eq!(
            truncate_field("this is a very long text that should be truncated", 10),
            "this is a ...(truncated)"
        );
    }

    #[test]
    fn test_truncate_field_respects_char_boundaries() {
        assert_eq!(truncate_field("ééé", 3), "é...(truncated)");
    }

    #[test]
    fn test_env_filter() {
        let config = LoggingConfig::default();
        assert_eq!(config.env_filter(), "info,term_profile=debug");

        let config = LoggingConfig {
            level: Level::WARN,
            profile_level: Level::TRACE,
            ..LoggingConfig::default()
        };
        assert_eq!(config.env_filter(), "warn,term_profile=trace");

        let config = LoggingConfig {
            env_filter: Some("term_profile=off".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(config.env_filter(), "term_profile=off");
    }

    #[test]
    fn test_second_init_is_a_configuration_error() {
        let _ = setup::init_logging(LoggingConfig::default());
        let err = setup::init_logging(LoggingConfig {
            json_format: true,
            ..LoggingConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, crate::error::ProfileError::Configuration(_)));
    }
}
