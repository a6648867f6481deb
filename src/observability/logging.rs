//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name; unknown names fall back to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Set when the requested directive was rejected and the default used.
    pub filter_warning: Option<String>,
}

impl LoggingConfig {
    /// Builds logging configuration from settings.
    ///
    /// The filter comes from `RUST_LOG`, then the configured directive, then
    /// `info` (`debug` when `verbose`).
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let default_directive = if verbose { "debug" } else { "info" };
        let directive = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| settings.filter.clone())
            .unwrap_or_else(|| default_directive.to_string());

        let (filter, filter_warning) = match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(e) => (
                EnvFilter::new(default_directive),
                Some(format!("invalid log filter '{directive}' ({e}), using {default_directive}")),
            ),
        };

        Self {
            format: settings
                .format
                .as_deref()
                .map(LogFormat::parse)
                .unwrap_or_default(),
            filter,
            file: settings.file.clone(),
            filter_warning,
        }
    }
}
