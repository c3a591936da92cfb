//! Entry points: which subgraph a process boots.

use std::fmt;
use std::str::FromStr;

use crate::graph::{Graph, GraphError};

/// Tokens accepted by a future release; requesting one today fails closed.
pub const RESERVED_ENTRY_POINTS: &[&str] = &["grpc", "cli"];

/// Why `token` is not a runnable entry point.
pub fn rejection_reason(token: &str) -> &'static str {
    if RESERVED_ENTRY_POINTS.contains(&token) {
        "reserved but not implemented"
    } else {
        "unknown token"
    }
}

/// Process role. A process runs exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Network server: config, metadata, logger, pool, query handler,
    /// repository, service, controller and the HTTP server.
    HttpServer,
}

impl EntryPoint {
    pub const fn token(self) -> &'static str {
        match self {
            EntryPoint::HttpServer => "http",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for EntryPoint {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(EntryPoint::HttpServer),
            other => Err(GraphError::UnknownEntryPoint(other.to_string())),
        }
    }
}

impl Graph {
    /// Resolve every component the entry point needs.
    pub async fn load(&self, entry: EntryPoint) -> Result<(), GraphError> {
        match entry {
            EntryPoint::HttpServer => {
                self.http_server().await?;
            }
        }
        tracing::debug!(entry = %entry, components = self.constructed().len(), "entry point loaded");
        Ok(())
    }

    /// Parse `token` and load it. Nothing is constructed for an unknown token.
    pub async fn load_token(&self, token: &str) -> Result<EntryPoint, GraphError> {
        let entry = token
            .parse::<EntryPoint>()
            .inspect_err(|e| tracing::error!(entry = token, error = %e, "entry point rejected"))?;
        self.load(entry).await?;
        Ok(entry)
    }
}
