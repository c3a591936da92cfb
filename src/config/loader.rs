//! Configuration loading from disk and environment.

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationErrors};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(ValidationErrors),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "configuration read error: {}", e),
            ConfigError::Parse(e) => write!(f, "configuration parse error: {}", e),
            ConfigError::Env { var, message } => {
                write!(f, "invalid environment variable {}: {}", var, message)
            }
            ConfigError::Validation(errors) => write!(f, "invalid configuration: {}", errors),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Env { .. } => None,
            ConfigError::Validation(e) => Some(e),
        }
    }
}

/// Load configuration the way the process does at startup.
///
/// Reads `path` (or [`DEFAULT_CONFIG_PATH`]); a missing file falls back to
/// defaults. Environment variables are applied on top, then the result is
/// validated.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

    let mut config = match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file bypassed");
            AppConfig::default()
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("APP_ENV") {
        config.app.metadata.environment = parse_var("APP_ENV", &v)?;
    }
    if let Some(v) = lookup("APP_VERSION") {
        config.app.metadata.version = Some(v);
    }
    if let Some(v) = lookup("HTTP_SERVER_HOST") {
        config.http.server.host = v;
    }
    if let Some(v) = lookup("HTTP_SERVER_PORT") {
        config.http.server.port = parse_var("HTTP_SERVER_PORT", &v)?;
    }
    if let Some(v) = lookup("LOGGER_FORMAT") {
        config.logger.format = Some(parse_var("LOGGER_FORMAT", &v)?);
    }
    if let Some(v) = lookup("LOGGER_LEVEL") {
        config.logger.level = parse_var("LOGGER_LEVEL", &v)?;
    }
    if let Some(v) = lookup("LOGGER_VERBOSE") {
        config.logger.verbose = parse_var("LOGGER_VERBOSE", &v)?;
    }
    if let Some(v) = lookup("POSTGRES_DB") {
        config.postgres.database = v;
    }
    if let Some(v) = lookup("POSTGRES_HOST") {
        config.postgres.host = v;
    }
    if let Some(v) = lookup("POSTGRES_PASSWORD") {
        config.postgres.password = v;
    }
    if let Some(v) = lookup("POSTGRES_PORT") {
        config.postgres.port = parse_var("POSTGRES_PORT", &v)?;
    }
    if let Some(v) = lookup("POSTGRES_USER") {
        config.postgres.user = v;
    }
    Ok(())
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        message: e.to_string(),
    })
}
