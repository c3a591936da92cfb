//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber from [`LoggerConfig`]
//! - Provide per-component spans carrying process and application fields
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, human-readable format for development
//! - `RUST_LOG` wins over the configured level when set, unless logging is
//!   disabled
//! - The subscriber is global; only the first logger in a process installs it

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{Environment, LogFormat, LoggerConfig};
use crate::metadata::Metadata;

/// Filter directive for the configured level.
pub fn filter_directive(config: &LoggerConfig) -> String {
    if config.enabled {
        config.level.as_str().to_string()
    } else {
        "off".to_string()
    }
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_subscriber(config: &LoggerConfig, format: LogFormat) -> bool {
    let filter = if config.enabled {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(config)))
    } else {
        EnvFilter::new(filter_directive(config))
    };

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_file(config.verbose)
            .with_line_number(config.verbose)
            .boxed(),
        LogFormat::Styled => fmt::layer()
            .with_file(config.verbose)
            .with_line_number(config.verbose)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .is_ok()
}

/// Application logger shared through the component graph.
#[derive(Debug, Clone)]
pub struct Logger {
    root: Span,
}

impl Logger {
    /// Install the subscriber (if none is set) and open the root span.
    pub fn new(config: &LoggerConfig, environment: Environment, metadata: &Metadata) -> Self {
        if !init_subscriber(config, config.format_for(environment)) {
            tracing::debug!("tracing subscriber already installed; reusing it");
        }

        let root = tracing::info_span!(
            "app",
            pid = std::process::id(),
            name = %metadata.name,
            version = %metadata.version,
        );

        Self { root }
    }

    /// Span for a component, tagged like `repo,example`.
    pub fn component(&self, tags: &'static str) -> Span {
        tracing::info_span!(parent: &self.root, "component", tags)
    }

    pub fn root(&self) -> &Span {
        &self.root
    }
}
