//! Configuration management.
//!
//! Configuration is layered: defaults, then a TOML file, then environment
//! variables (a `.env` file is loaded by the binary first), then CLI flags.

mod validation;

pub use validation::ValidationPolicy;

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8787;

/// Default Prometheus listener port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Main configuration for promptops.
#[derive(Debug, Clone, Default)]
pub struct PromptOpsConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Prompt store settings.
    pub store: StoreSettings,
    /// Create-request validation policy.
    pub validation: ValidationPolicy,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
    /// Problems found while loading, kept until logging is ready.
    warnings: Vec<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    /// Address to bind.
    pub bind: IpAddr,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerSettings {
    /// Returns the socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Available prompt store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackendType {
    /// In-process list (local fallback mode).
    #[default]
    Memory,
    /// `SQLite` database file.
    Sqlite,
    /// PostgreSQL database (requires the `postgres` feature).
    PostgreSQL,
}

impl StoreBackendType {
    /// Parses a backend name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "local" | "fallback" => Some(Self::Memory),
            "sqlite" => Some(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Some(Self::PostgreSQL),
            _ => None,
        }
    }

    /// Returns the canonical backend name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
            Self::PostgreSQL => "postgresql",
        }
    }
}

/// Prompt store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// Backend to use.
    pub backend: StoreBackendType,
    /// Database path for `SQLite`.
    pub path: Option<PathBuf>,
    /// Connection string for PostgreSQL.
    pub connection_string: Option<String>,
    /// Write a prompt and its versions in one transaction.
    pub atomic_writes: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackendType::Memory,
            path: None,
            connection_string: None,
            atomic_writes: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `promptops=debug,tower_http=info`.
    pub filter: Option<String>,
}

/// Metrics settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Whether the Prometheus recorder is installed.
    pub enabled: Option<bool>,
    /// Port of the Prometheus scrape listener.
    pub port: Option<u16>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Server section.
    pub server: Option<ConfigFileServer>,
    /// Store section.
    pub store: Option<ConfigFileStore>,
    /// Validation section.
    pub validation: Option<ConfigFileValidation>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileServer {
    /// Bind address.
    pub bind: Option<IpAddr>,
    /// Port.
    pub port: Option<u16>,
}

/// Store section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileStore {
    /// Backend name.
    pub backend: Option<String>,
    /// `SQLite` path.
    pub path: Option<String>,
    /// PostgreSQL connection string.
    pub connection_string: Option<String>,
    /// Transactional creates.
    pub atomic_writes: Option<bool>,
}

/// Validation section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileValidation {
    /// Accept unknown models.
    pub allow_unknown_models: Option<bool>,
    /// Enforce generation parameter bounds.
    pub enforce_config_bounds: Option<bool>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Format.
    pub format: Option<String>,
    /// Log file.
    pub file: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileMetrics {
    /// Enabled.
    pub enabled: Option<bool>,
    /// Port.
    pub port: Option<u16>,
}

impl PromptOpsConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from an explicit file, or the default location.
    ///
    /// An explicit path must exist and parse. The default location is
    /// optional and silently skipped when absent or invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::operation("read_config_file", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::operation("parse_config_file", e))?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/promptops/` on macOS)
    /// 2. XDG config dir (`~/.config/promptops/`)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("promptops").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("promptops")
                .join("config.toml"),
        ];

        let mut warnings = Vec::new();
        for candidate in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(candidate) {
                Ok(mut config) => {
                    config.warnings = warnings;
                    return config;
                },
                Err(e) => {
                    warnings.push(format!("ignoring config file {}: {e}", candidate.display()));
                },
            }
        }

        Self {
            warnings,
            ..Self::default()
        }
    }

    /// Returns the problems found while loading and applying overrides.
    ///
    /// Loading runs before logging is initialized, so callers log these
    /// once a subscriber is installed.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Converts a `ConfigFile` to `PromptOpsConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(server) = file.server {
            if let Some(bind) = server.bind {
                config.server.bind = bind;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
        }
        if let Some(store) = file.store {
            if let Some(backend) = store.backend {
                config.store.backend = StoreBackendType::parse(&backend).ok_or_else(|| {
                    crate::Error::InvalidInput(format!("unknown store backend: {backend}"))
                })?;
            }
            config.store.path = store.path.map(PathBuf::from);
            config.store.connection_string = store.connection_string;
            if let Some(atomic) = store.atomic_writes {
                config.store.atomic_writes = atomic;
            }
        }
        if let Some(validation) = file.validation {
            if let Some(v) = validation.allow_unknown_models {
                config.validation.allow_unknown_models = v;
            }
            if let Some(v) = validation.enforce_config_bounds {
                config.validation.enforce_config_bounds = v;
            }
        }
        if let Some(logging) = file.logging {
            config.logging.format = logging.format;
            config.logging.file = logging.file.map(PathBuf::from);
            config.logging.filter = logging.filter;
        }
        if let Some(metrics) = file.metrics {
            config.metrics.enabled = metrics.enabled;
            config.metrics.port = metrics.port;
        }

        Ok(config)
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored and recorded in [`Self::warnings`].
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut warnings = Vec::new();

        // PORT is honoured for compatibility with hosted environments.
        for key in ["PORT", "PROMPTOPS_PORT"] {
            if let Some(port) = var(key).and_then(|v| parse_or_warn::<u16>(&mut warnings, key, &v)) {
                self.server.port = port;
            }
        }
        if let Some(bind) =
            var("PROMPTOPS_BIND").and_then(|v| parse_or_warn(&mut warnings, "PROMPTOPS_BIND", &v))
        {
            self.server.bind = bind;
        }
        if let Some(backend) = var("PROMPTOPS_STORE") {
            match StoreBackendType::parse(&backend) {
                Some(parsed) => self.store.backend = parsed,
                None => warnings.push(format!(
                    "ignoring unknown PROMPTOPS_STORE={backend}, keeping {}",
                    self.store.backend.as_str()
                )),
            }
        }
        if let Some(path) = var("PROMPTOPS_DB_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }
        if let Some(url) = var("PROMPTOPS_DATABASE_URL") {
            self.store.connection_string = Some(url);
        }
        if let Some(v) = var("PROMPTOPS_ATOMIC_WRITES")
            .and_then(|v| parse_bool(&mut warnings, "PROMPTOPS_ATOMIC_WRITES", &v))
        {
            self.store.atomic_writes = v;
        }
        if let Some(v) = var("PROMPTOPS_ALLOW_UNKNOWN_MODELS")
            .and_then(|v| parse_bool(&mut warnings, "PROMPTOPS_ALLOW_UNKNOWN_MODELS", &v))
        {
            self.validation.allow_unknown_models = v;
        }
        if let Some(format) = var("PROMPTOPS_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = var("PROMPTOPS_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        if let Some(v) = var("PROMPTOPS_METRICS_ENABLED")
            .and_then(|v| parse_bool(&mut warnings, "PROMPTOPS_METRICS_ENABLED", &v))
        {
            self.metrics.enabled = Some(v);
        }
        if let Some(port) = var("PROMPTOPS_METRICS_PORT")
            .and_then(|v| parse_or_warn(&mut warnings, "PROMPTOPS_METRICS_PORT", &v))
        {
            self.metrics.port = Some(port);
        }

        self.warnings.extend(warnings);
        self
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Sets the store backend.
    #[must_use]
    pub fn with_store_backend(mut self, backend: StoreBackendType) -> Self {
        self.store.backend = backend;
        self
    }

    /// Sets the `SQLite` path.
    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = Some(path.into());
        self
    }

    /// Sets the PostgreSQL connection string.
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.store.connection_string = Some(url.into());
        self
    }
}

fn parse_or_warn<T: std::str::FromStr>(
    warnings: &mut Vec<String>,
    key: &str,
    value: &str,
) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        warnings.push(format!("ignoring unparseable {key}={value}"));
    }
    parsed
}

fn parse_bool(warnings: &mut Vec<String>, key: &str, value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warnings.push(format!("ignoring unparseable boolean {key}={value}"));
            None
        },
    }
}
