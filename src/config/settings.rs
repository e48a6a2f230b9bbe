//! TOML-based configuration for adhoc.
//!
//! Supports a config file (adhoc.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! path = "${ADHOC_DATA_DIR}/geo.db"
//!
//! [database.pool]
//! max_size = 8
//! min_idle = 1
//! connection_timeout = "5s"
//!
//! [catalog]
//! refresh_interval = "5m"   # "0s" disables periodic refresh
//!
//! [report]
//! default_limit = 1000
//! # max_limit = 10000      # optional cap; unset runs any limit as requested
//! timeout = "30s"
//! dialect = "postgres"      # dialect used by `compile` when none is given
//!
//! [logging]
//! filter = "adhoc=info"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ADHOC_CONFIG";

/// Environment variable overriding `[database] path`.
pub const DATABASE_ENV_VAR: &str = "ADHOC_DATABASE";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid duration format: {0}")]
    InvalidDuration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database location and connection pool.
    pub database: DatabaseSettings,

    /// Catalog snapshot refresh.
    pub catalog: CatalogSettings,

    /// Report compilation and execution limits.
    pub report: ReportSettings,

    /// Log filtering.
    pub logging: LoggingSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file (supports ${ENV_VAR} expansion).
    /// `:memory:` opens a private in-memory database.
    pub path: String,

    /// Connection pool settings.
    pub pool: PoolSettings,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "adhoc.db".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

impl DatabaseSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.path)
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Maximum number of pooled connections.
    pub max_size: u32,

    /// Minimum number of idle connections kept open.
    pub min_idle: Option<u32>,

    /// Maximum wait for a connection checkout (e.g., "5s").
    pub connection_timeout: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 8,
            min_idle: Some(1),
            connection_timeout: "5s".to_string(),
        }
    }
}

impl PoolSettings {
    pub fn connection_timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration(&self.connection_timeout)
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Age after which a catalog snapshot is re-introspected ("0s" = never).
    pub refresh_interval: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            refresh_interval: "5m".to_string(),
        }
    }
}

impl CatalogSettings {
    pub fn refresh_interval(&self) -> Result<Duration, SettingsError> {
        parse_duration(&self.refresh_interval)
    }
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Row limit applied when a request does not set one.
    pub default_limit: u64,

    /// Optional upper bound on a requested limit; larger values are clamped.
    pub max_limit: Option<u64>,

    /// Maximum execution time per report (e.g., "30s").
    pub timeout: String,

    /// Dialect used for compile-only output when none is requested.
    pub dialect: Dialect,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_limit: 1000,
            max_limit: None,
            timeout: "30s".to_string(),
            dialect: Dialect::Sqlite,
        }
    }
}

impl ReportSettings {
    pub fn timeout(&self) -> Result<Duration, SettingsError> {
        parse_duration(&self.timeout)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "adhoc=info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ADHOC_CONFIG`
    /// 2. `./adhoc.toml`
    /// 3. `~/.config/adhoc/config.toml`
    ///
    /// `ADHOC_DATABASE`, when set, replaces `[database] path`.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Self::locate()?;

        if let Ok(path) = env::var(DATABASE_ENV_VAR) {
            settings.database.path = path;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn locate() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("adhoc.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("adhoc").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Check cross-field constraints and that every duration parses.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.database.pool.max_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "database.pool.max_size must be at least 1".into(),
            ));
        }
        if let Some(min_idle) = self.database.pool.min_idle {
            if min_idle > self.database.pool.max_size {
                return Err(SettingsError::InvalidConfig(format!(
                    "database.pool.min_idle ({}) exceeds max_size ({})",
                    min_idle, self.database.pool.max_size
                )));
            }
        }
        if self.report.default_limit == 0 || self.report.max_limit == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "report limits must be positive".into(),
            ));
        }
        if let Some(max_limit) = self.report.max_limit {
            if self.report.default_limit > max_limit {
                return Err(SettingsError::InvalidConfig(format!(
                    "report.default_limit ({}) exceeds max_limit ({})",
                    self.report.default_limit, max_limit
                )));
            }
        }

        self.database.pool.connection_timeout()?;
        self.catalog.refresh_interval()?;
        self.report.timeout()?;
        Ok(())
    }
}

/// Parse a duration written as `<n>ms`, `<n>s`, `<n>m` or `<n>h`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, SettingsError> {
    let trimmed = s.trim();
    let invalid = || SettingsError::InvalidDuration(s.to_string());

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    match unit.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 3600)),
        _ => Err(invalid()),
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
