//! Logging configuration and initialization.
//!
//! Centralized `tracing` setup for binaries embedding the Datadoc core.
//! Use the structured logging macros (`trace!`, `debug!`, `info!`, `warn!`,
//! `error!`) throughout; never `println!` or `eprintln!`.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{DatadocError, Result};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable text output
    #[default]
    Text,
    /// Newline-delimited JSON, for log aggregation
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directives, same syntax as `RUST_LOG`
    pub filter: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Build a configuration from `DATADOC_LOG` / `DATADOC_LOG_FORMAT`,
    /// falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(filter) = std::env::var("DATADOC_LOG") {
            config.filter = filter;
        }
        if let Ok(format) = std::env::var("DATADOC_LOG_FORMAT") {
            if format.eq_ignore_ascii_case("json") {
                config.format = LogFormat::Json;
            }
        }
        config
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns an error if a subscriber has already been installed or the
/// filter directives cannot be parsed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| DatadocError::config(format!("Invalid log filter '{}': {}", config.filter, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    result.map_err(|e| DatadocError::config(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let config = LogConfig {
            filter: "not==valid==filter".to_string(),
            format: LogFormat::Text,
        };
        assert!(init_logging(&config).is_err());
    }
}
