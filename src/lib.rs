//! Component bootstrapper for a layered HTTP service.
//!
//! A lazily resolved singleton [`graph`] builds configuration, logging, the
//! Postgres pool and the example resource stack on demand. The [`lifecycle`]
//! supervisor boots one entry point, serves until a signal or failure, and
//! tears down in order.

pub mod config;
pub mod db;
pub mod example;
pub mod graph;
pub mod http;
pub mod lifecycle;
pub mod metadata;
pub mod observability;
pub mod query;

pub use config::AppConfig;
pub use graph::{EntryPoint, Graph, GraphError, GraphSeed};
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, RunConfig, RunError, Runtime};
