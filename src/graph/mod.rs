//! Component graph.
//!
//! # Data Flow
//! ```text
//! entry point (entry.rs)
//!     → http_server
//!         → example_controller → example_service → example_repo → db_pool
//!         → query_handler
//!         → logger → metadata → config
//! ```
//!
//! # Design Decisions
//! - One `OnceCell` slot per component: concurrent first callers wait on a
//!   single construction (single-flight), later callers get the cached `Arc`
//! - Accessors are `async fn`s calling each other. A dependency cycle would
//!   produce an infinitely sized future, which the compiler rejects
//! - A failed constructor leaves its slot empty and surfaces a
//!   [`GraphError::Construction`]; boot treats it as fatal
//! - The graph is an explicit object shared as `Arc<Graph>`; no globals

pub mod entry;
pub mod error;

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::config::{self, AppConfig};
use crate::db;
use crate::example::{ExampleController, ExampleRepository, ExampleService};
use crate::http::{HttpServer, ServerSettings};
use crate::metadata::Metadata;
use crate::observability::Logger;
use crate::query::QueryHandler;

pub use entry::{EntryPoint, RESERVED_ENTRY_POINTS};
pub use error::GraphError;

/// Components held by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Config,
    Metadata,
    Logger,
    DbPool,
    QueryHandler,
    ExampleRepository,
    ExampleService,
    ExampleController,
    HttpServer,
}

impl Component {
    pub const fn name(self) -> &'static str {
        match self {
            Component::Config => "configuration",
            Component::Metadata => "metadata",
            Component::Logger => "logger",
            Component::DbPool => "postgres client",
            Component::QueryHandler => "query handler",
            Component::ExampleRepository => "example repository",
            Component::ExampleService => "example service",
            Component::ExampleController => "example controller",
            Component::HttpServer => "http server",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pre-built components placed into their slots when the graph is created.
#[derive(Debug, Default)]
pub struct GraphSeed {
    /// Configuration file used when no config is seeded.
    pub config_path: Option<PathBuf>,
    pub config: Option<Arc<AppConfig>>,
    pub metadata: Option<Arc<Metadata>>,
    pub logger: Option<Arc<Logger>>,
    pub db_pool: Option<Arc<PgPool>>,
    pub query_handler: Option<Arc<QueryHandler>>,
    pub example_repo: Option<Arc<ExampleRepository>>,
    pub example_service: Option<Arc<ExampleService>>,
    pub example_controller: Option<Arc<ExampleController>>,
}

impl GraphSeed {
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Some(Arc::new(config)),
            ..Self::default()
        }
    }
}

/// Lazily constructed singleton components of the application.
#[derive(Debug)]
pub struct Graph {
    config_path: Option<PathBuf>,
    config: OnceCell<Arc<AppConfig>>,
    metadata: OnceCell<Arc<Metadata>>,
    logger: OnceCell<Arc<Logger>>,
    db_pool: OnceCell<Arc<PgPool>>,
    query_handler: OnceCell<Arc<QueryHandler>>,
    example_repo: OnceCell<Arc<ExampleRepository>>,
    example_service: OnceCell<Arc<ExampleService>>,
    example_controller: OnceCell<Arc<ExampleController>>,
    http_server: OnceCell<Arc<HttpServer>>,
    constructed: Mutex<Vec<Component>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphSeed::default())
    }
}

impl Graph {
    pub fn new(seed: GraphSeed) -> Self {
        Self {
            config_path: seed.config_path,
            config: OnceCell::new_with(seed.config),
            metadata: OnceCell::new_with(seed.metadata),
            logger: OnceCell::new_with(seed.logger),
            db_pool: OnceCell::new_with(seed.db_pool),
            query_handler: OnceCell::new_with(seed.query_handler),
            example_repo: OnceCell::new_with(seed.example_repo),
            example_service: OnceCell::new_with(seed.example_service),
            example_controller: OnceCell::new_with(seed.example_controller),
            http_server: OnceCell::new(),
            constructed: Mutex::new(Vec::new()),
        }
    }

    /// Components built by this graph, in construction order. Seeded
    /// components are not included.
    pub fn constructed(&self) -> Vec<Component> {
        self.constructed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `component` was built (0 or 1).
    pub fn construction_count(&self, component: Component) -> usize {
        self.constructed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| **c == component)
            .count()
    }

    fn record(&self, component: Component) {
        self.constructed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(component);
        tracing::debug!(component = %component, "component constructed");
    }

    fn fail<E>(&self, component: Component, err: E) -> GraphError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let err = GraphError::construction(component, err);
        tracing::error!(component = %component, error = %err, "component construction failed");
        err
    }

    /// Configuration snapshot.
    pub async fn config(&self) -> Result<Arc<AppConfig>, GraphError> {
        self.config
            .get_or_try_init(|| async {
                let config = config::load_configuration(self.config_path.as_deref())
                    .map_err(|e| self.fail(Component::Config, e))?;
                self.record(Component::Config);
                Ok(Arc::new(config))
            })
            .await
            .cloned()
    }

    /// Application name and version.
    pub async fn metadata(&self) -> Result<Arc<Metadata>, GraphError> {
        self.metadata
            .get_or_try_init(|| async {
                let config = self.config().await?;
                let metadata = Metadata::load(&config.app.metadata)
                    .map_err(|e| self.fail(Component::Metadata, e))?;
                self.record(Component::Metadata);
                Ok(Arc::new(metadata))
            })
            .await
            .cloned()
    }

    /// Structured logger; installs the tracing subscriber on first build.
    pub async fn logger(&self) -> Result<Arc<Logger>, GraphError> {
        self.logger
            .get_or_try_init(|| async {
                let config = self.config().await?;
                let metadata = self.metadata().await?;
                let logger = Logger::new(&config.logger, config.app.metadata.environment, &metadata);
                self.record(Component::Logger);
                Ok(Arc::new(logger))
            })
            .await
            .cloned()
    }

    /// Shared PostgreSQL pool.
    pub async fn db_pool(&self) -> Result<Arc<PgPool>, GraphError> {
        self.db_pool
            .get_or_try_init(|| async {
                let config = self.config().await?;
                let logger = self.logger().await?;
                let pool = db::create_pool(&config.postgres)
                    .map_err(|e| self.fail(Component::DbPool, e))?;
                logger.component("db").in_scope(|| {
                    tracing::info!(
                        host = %config.postgres.host,
                        port = config.postgres.port,
                        database = %config.postgres.database,
                        max_connections = config.postgres.max_connections,
                        "postgres pool created"
                    )
                });
                self.record(Component::DbPool);
                Ok(Arc::new(pool))
            })
            .await
            .cloned()
    }

    /// Paging and sorting defaults for list endpoints.
    pub async fn query_handler(&self) -> Result<Arc<QueryHandler>, GraphError> {
        self.query_handler
            .get_or_try_init(|| async {
                let config = self.config().await?;
                let handler = QueryHandler::new(&config.http.router)
                    .map_err(|e| self.fail(Component::QueryHandler, e))?;
                self.record(Component::QueryHandler);
                Ok(Arc::new(handler))
            })
            .await
            .cloned()
    }

    pub async fn example_repo(&self) -> Result<Arc<ExampleRepository>, GraphError> {
        self.example_repo
            .get_or_try_init(|| async {
                let logger = self.logger().await?;
                let pool = self.db_pool().await?;
                let repo = ExampleRepository::new(PgPool::clone(&pool), logger.component("repo,example"));
                self.record(Component::ExampleRepository);
                Ok(Arc::new(repo))
            })
            .await
            .cloned()
    }

    pub async fn example_service(&self) -> Result<Arc<ExampleService>, GraphError> {
        self.example_service
            .get_or_try_init(|| async {
                let logger = self.logger().await?;
                let repo = self.example_repo().await?;
                let service = ExampleService::new(repo, logger.component("service,example"));
                self.record(Component::ExampleService);
                Ok(Arc::new(service))
            })
            .await
            .cloned()
    }

    pub async fn example_controller(&self) -> Result<Arc<ExampleController>, GraphError> {
        self.example_controller
            .get_or_try_init(|| async {
                let logger = self.logger().await?;
                let service = self.example_service().await?;
                let query = self.query_handler().await?;
                let controller =
                    ExampleController::new(service, query, logger.component("controller,example"));
                self.record(Component::ExampleController);
                Ok(Arc::new(controller))
            })
            .await
            .cloned()
    }

    /// HTTP server with every route mounted.
    pub async fn http_server(&self) -> Result<Arc<HttpServer>, GraphError> {
        self.http_server
            .get_or_try_init(|| async {
                let config = self.config().await?;
                let logger = self.logger().await?;
                let metadata = self.metadata().await?;
                let controller = self.example_controller().await?;

                let settings = ServerSettings {
                    host: config.http.server.host.clone(),
                    port: config.http.server.port,
                    namespace: config.http.router.namespace.clone(),
                };
                let server = HttpServer::new(settings, &controller, &metadata, logger.component("http"))
                    .map_err(|e| self.fail(Component::HttpServer, e))?;
                self.record(Component::HttpServer);
                Ok(Arc::new(server))
            })
            .await
            .cloned()
    }

    /// Logger if already built. Never constructs.
    pub fn peek_logger(&self) -> Option<Arc<Logger>> {
        self.logger.get().cloned()
    }

    /// Whether log events reach an output: a logger was built from a config
    /// with logging enabled.
    pub fn logging_active(&self) -> bool {
        self.logger.get().is_some() && self.config.get().is_some_and(|c| c.logger.enabled)
    }

    /// Pool if already built. Never constructs.
    pub fn peek_db_pool(&self) -> Option<Arc<PgPool>> {
        self.db_pool.get().cloned()
    }

    /// Server if already built. Never constructs.
    pub fn peek_http_server(&self) -> Option<Arc<HttpServer>> {
        self.http_server.get().cloned()
    }
}
