//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, non-empty connection parameters)
//! - Validate the router namespace so it can be used as a path segment
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), ValidationErrors>
//! - Sections are validated independently so a builder can re-check only the
//!   section it consumes (the pool re-validates `postgres`)

use std::fmt;

use crate::config::schema::{AppConfig, HttpConfig, MetadataConfig, PostgresConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every validation error found in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn finish(errors: Vec<ValidationError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Validate the whole configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    collect_metadata(&config.app.metadata, &mut errors);
    collect_http(&config.http, &mut errors);
    collect_postgres(&config.postgres, &mut errors);
    finish(errors)
}

/// Validate the `postgres` section only.
pub fn validate_postgres(postgres: &PostgresConfig) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    collect_postgres(postgres, &mut errors);
    finish(errors)
}

/// Namespaces become a single path segment.
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn collect_metadata(metadata: &MetadataConfig, errors: &mut Vec<ValidationError>) {
    if metadata.name.trim().is_empty() {
        errors.push(ValidationError::new("app.metadata.name", "must not be empty"));
    }
    if let Some(version) = &metadata.version {
        if version.trim().is_empty() {
            errors.push(ValidationError::new(
                "app.metadata.version",
                "must not be empty when set",
            ));
        }
    }
}

fn collect_http(http: &HttpConfig, errors: &mut Vec<ValidationError>) {
    if !is_valid_namespace(&http.router.namespace) {
        errors.push(ValidationError::new(
            "http.router.namespace",
            format!(
                "'{}' must be a non-empty path segment of [A-Za-z0-9_-]",
                http.router.namespace
            ),
        ));
    }
    if http.router.paging.default_limit == 0 {
        errors.push(ValidationError::new(
            "http.router.paging.default_limit",
            "must be greater than 0",
        ));
    }
    if http.router.sorting.default_attr.trim().is_empty() {
        errors.push(ValidationError::new(
            "http.router.sorting.default_attr",
            "must not be empty",
        ));
    }
    if http.server.host.trim().is_empty() {
        errors.push(ValidationError::new("http.server.host", "must not be empty"));
    }
    if http.server.shutdown_timeout_secs == Some(0) {
        errors.push(ValidationError::new(
            "http.server.shutdown_timeout_secs",
            "must be greater than 0 when set",
        ));
    }
}

fn collect_postgres(postgres: &PostgresConfig, errors: &mut Vec<ValidationError>) {
    let required = [
        ("postgres.database", &postgres.database),
        ("postgres.host", &postgres.host),
        ("postgres.password", &postgres.password),
        ("postgres.user", &postgres.user),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "is required"));
        }
    }
    if postgres.port == 0 {
        errors.push(ValidationError::new("postgres.port", "must be between 1 and 65535"));
    }
    if postgres.max_connections == 0 {
        errors.push(ValidationError::new(
            "postgres.max_connections",
            "must be greater than 0",
        ));
    }
}
