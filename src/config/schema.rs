//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Application-level settings.
    pub app: AppSection,

    /// HTTP router and server settings.
    pub http: HttpConfig,

    /// Logger settings.
    pub logger: LoggerConfig,

    /// PostgreSQL connection parameters.
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppSection {
    pub metadata: MetadataConfig,
}

/// Application metadata settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetadataConfig {
    /// Deployment environment.
    pub environment: Environment,

    /// Application name, used when no metadata file is configured.
    pub name: String,

    /// Version override. Takes precedence over the metadata file.
    pub version: Option<String>,

    /// Optional JSON metadata file (`{"name": ..., "version": ...}`).
    pub path: Option<PathBuf>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            name: "svckit".to_string(),
            version: None,
            path: None,
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!("expected one of development|production, got '{}'", other)),
        }
    }
}

/// HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub router: RouterConfig,
    pub server: ServerConfig,
}

/// Router configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Path prefix for every route (e.g. `domain` → `/domain/health`).
    pub namespace: String,

    /// Paging defaults for list queries.
    pub paging: PagingConfig,

    /// Sorting defaults for list queries.
    pub sorting: SortingConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            namespace: "domain".to_string(),
            paging: PagingConfig::default(),
            sorting: SortingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PagingConfig {
    pub default_limit: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SortingConfig {
    pub default_attr: String,
    pub default_order: SortOrder,
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            default_attr: "created_on".to_string(),
            default_order: SortOrder::Desc,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port. `0` binds an ephemeral port.
    pub port: u16,

    /// Upper bound on graceful shutdown. Unset waits until the server drains.
    pub shutdown_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9202,
            shutdown_timeout_secs: None,
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Disable to silence all output.
    pub enabled: bool,

    /// Output format. Unset picks one from the environment, see
    /// [`LoggerConfig::format_for`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,

    /// Minimum level.
    pub level: LogLevel,

    /// Include source file and line in every event.
    pub verbose: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: None,
            level: LogLevel::Info,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Styled,
}

impl LoggerConfig {
    /// Explicit format if set, otherwise styled output in development and
    /// JSON everywhere else.
    pub fn format_for(&self, environment: Environment) -> LogFormat {
        self.format.unwrap_or(match environment {
            Environment::Development => LogFormat::Styled,
            Environment::Production => LogFormat::Json,
        })
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "styled" => Ok(Self::Styled),
            other => Err(format!("expected one of json|styled, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("expected one of debug|info|warn|error, got '{}'", other)),
        }
    }
}

/// PostgreSQL connection parameters.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PostgresConfig {
    pub database: String,
    pub host: String,
    pub password: String,
    pub port: u16,
    pub user: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database: "svcdb".to_string(),
            host: "postgres".to_string(),
            password: "postgres".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            max_connections: 10,
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("database", &self.database)
            .field("host", &self.host)
            .field("password", &"***")
            .field("port", &self.port)
            .field("user", &self.user)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
