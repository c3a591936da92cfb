//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc through the component graph
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_configuration, ConfigError, DEFAULT_CONFIG_PATH};
pub use schema::{
    AppConfig, Environment, HttpConfig, LogFormat, LogLevel, LoggerConfig, MetadataConfig,
    PostgresConfig, RouterConfig, ServerConfig, SortOrder,
};
pub use validation::{ValidationError, ValidationErrors};
