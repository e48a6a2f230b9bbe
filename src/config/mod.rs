//! Configuration module for adhoc.
//!
//! Handles the settings file, environment variable expansion and overrides.

mod settings;

pub use settings::{
    expand_env_vars, parse_duration, CatalogSettings, DatabaseSettings, LoggingSettings,
    PoolSettings, ReportSettings, Settings, SettingsError, CONFIG_ENV_VAR, DATABASE_ENV_VAR,
};
