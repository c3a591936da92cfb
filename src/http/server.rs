//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Build the Axum router (base, health, example routes, JSON 404 fallback)
//! - Wire up middleware (request ID, tracing, in-flight abort)
//! - Bind the listener and run the accept loop
//! - Stop accepting and drain on request from the shutdown path
//! - Abort open requests when the drain deadline passes or shutdown is forced
//!
//! # State Transitions
//! ```text
//! Idle → Serving(addr): listener bound, accept loop running
//! Serving → Stopped:    drain finished, drain aborted, or accept loop failed
//! Idle → Idle:          shutdown before serve; serve then returns at once
//! ```

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{Instrument, Span};

use crate::config::validation::is_valid_namespace;
use crate::example::ExampleController;
use crate::http::response::ApiError;
use crate::metadata::Metadata;

/// Observable server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Serving(SocketAddr),
    Stopped,
}

/// Errors building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid router namespace '{0}'")]
    InvalidNamespace(String),

    #[error("http server host must not be empty")]
    EmptyHost,
}

/// Errors from the accept loop.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors stopping the server.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("http server did not stop within {0:?}")]
    Timeout(Duration),

    #[error("http server drain cut short by forced shutdown")]
    Forced,

    #[error("http server state channel closed")]
    StateClosed,
}

/// Bind settings for [`HttpServer`].
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub namespace: String,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP server for the service.
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    settings: ServerSettings,
    state: watch::Sender<ServerState>,
    stop: CancellationToken,
    abort: CancellationToken,
    span: Span,
}

impl HttpServer {
    /// Create the server with all application routes.
    pub fn new(
        settings: ServerSettings,
        controller: &Arc<ExampleController>,
        metadata: &Metadata,
        span: Span,
    ) -> Result<Self, ServerError> {
        Self::validate(&settings)?;
        let ns = &settings.namespace;
        let app = Router::new()
            .route(&format!("/{ns}"), get(base_handler))
            .route(&format!("/{ns}/health"), get(health_handler))
            .with_state(Arc::new(metadata.clone()))
            .nest(&format!("/{ns}/examples"), controller.routes());

        Self::with_router(settings, app, span)
    }

    /// Create the server around an already assembled router.
    pub fn with_router(settings: ServerSettings, app: Router, span: Span) -> Result<Self, ServerError> {
        Self::validate(&settings)?;

        let abort = CancellationToken::new();
        let router = Self::apply_middleware(app, abort.clone());
        let (state, _) = watch::channel(ServerState::Idle);

        Ok(Self {
            router,
            settings,
            state,
            stop: CancellationToken::new(),
            abort,
            span,
        })
    }

    fn validate(settings: &ServerSettings) -> Result<(), ServerError> {
        if !is_valid_namespace(&settings.namespace) {
            return Err(ServerError::InvalidNamespace(settings.namespace.clone()));
        }
        if settings.host.trim().is_empty() {
            return Err(ServerError::EmptyHost);
        }
        Ok(())
    }

    /// Request ID is assigned before the trace span opens, and copied onto
    /// the response on the way out. Unmatched paths get a JSON 404.
    fn apply_middleware(app: Router, abort: CancellationToken) -> Router {
        app.fallback(not_found)
            .layer(middleware::from_fn_with_state(abort, abort_in_flight))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Bound address while serving.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self.state() {
            ServerState::Serving(addr) => Some(addr),
            _ => None,
        }
    }

    /// Bind and serve until [`shutdown`](Self::shutdown) is called.
    pub async fn serve(&self) -> Result<(), ServeError> {
        let address = self.settings.address();
        let listener = TcpListener::bind((self.settings.host.as_str(), self.settings.port))
            .await
            .map_err(|source| ServeError::Bind {
                address: address.clone(),
                source,
            })?;
        let addr = listener.local_addr()?;

        // The check and the transition happen under the channel lock, so a
        // concurrent `shutdown` either sees `Serving` or we see its cancel.
        let started = self.state.send_if_modified(|state| {
            if *state == ServerState::Idle && !self.stop.is_cancelled() {
                *state = ServerState::Serving(addr);
                true
            } else {
                false
            }
        });
        if !started {
            self.span
                .in_scope(|| tracing::info!("shutdown requested before serving; not starting"));
            return Ok(());
        }

        self.span
            .in_scope(|| tracing::info!(address = %addr, "http server listening"));

        let router = self.router.clone();
        let stop = self.stop.clone();
        let abort = self.abort.clone();
        let result = async move {
            let graceful = axum::serve(listener, router)
                .with_graceful_shutdown(stop.cancelled_owned())
                .into_future();
            tokio::select! {
                result = graceful => result,
                _ = abort.cancelled() => {
                    tracing::warn!("drain aborted; dropping open connections");
                    Ok(())
                }
            }
        }
        .instrument(self.span.clone())
        .await;

        self.state.send_replace(ServerState::Stopped);
        self.span.in_scope(|| tracing::info!("http server stopped"));
        result.map_err(ServeError::Io)
    }

    /// Stop accepting connections and wait for in-flight requests to drain.
    ///
    /// Returns immediately if the server never started. `deadline` bounds the
    /// drain: once it passes, open requests are answered with 503, the accept
    /// loop exits, and `Timeout` is returned after the server has stopped.
    /// `None` waits for the drain however long it takes.
    pub async fn shutdown(&self, deadline: Option<Duration>) -> Result<(), ShutdownError> {
        self.stop.cancel();

        let Some(limit) = deadline else {
            return self.stopped().await;
        };
        match tokio::time::timeout(limit, self.stopped()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                self.span
                    .in_scope(|| tracing::warn!(deadline = ?limit, "drain deadline passed"));
                self.force_stop().await?;
                Err(ShutdownError::Timeout(limit))
            }
        }
    }

    /// Stop without draining. Open requests are answered with 503 and their
    /// handlers dropped. Resolves once the accept loop has exited.
    pub async fn force_stop(&self) -> Result<(), ShutdownError> {
        self.stop.cancel();
        self.abort.cancel();
        self.stopped().await
    }

    async fn stopped(&self) -> Result<(), ShutdownError> {
        let mut rx = self.state.subscribe();
        rx.wait_for(|state| !matches!(state, ServerState::Serving(_)))
            .await
            .map(|_| ())
            .map_err(|_| ShutdownError::StateClosed)
    }
}

/// Races the handler against the abort token. Dropping the handler releases
/// whatever it holds, pooled connections included.
async fn abort_in_flight(
    State(abort): State<CancellationToken>,
    request: Request,
    next: Next,
) -> Response {
    tokio::select! {
        response = next.run(request) => response,
        _ = abort.cancelled() => {
            ApiError::Unavailable("server is shutting down".to_string()).into_response()
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("path not found".to_string())
}

async fn base_handler(State(metadata): State<Arc<Metadata>>, request: Request) -> impl IntoResponse {
    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    Json(json!({
        "data": "base router is working...",
        "meta": { "name": metadata.name, "version": metadata.version },
        "request": { "host": host, "path": request.uri().path() },
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "meta": { "status": "healthy" } }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn settings(port: u16) -> ServerSettings {
        ServerSettings {
            host: "127.0.0.1".to_string(),
            port,
            namespace: "svc".to_string(),
        }
    }

    async fn wait_serving(server: &HttpServer) -> SocketAddr {
        let mut rx = server.subscribe();
        let state = *rx
            .wait_for(|s| matches!(s, ServerState::Serving(_)))
            .await
            .unwrap();
        match state {
            ServerState::Serving(addr) => addr,
            _ => unreachable!(),
        }
    }

    #[test]
    fn rejects_bad_namespace() {
        let err = HttpServer::with_router(
            ServerSettings {
                namespace: "a/b".into(),
                ..settings(0)
            },
            Router::new(),
            Span::none(),
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::InvalidNamespace(_)));
    }

    #[tokio::test]
    async fn shutdown_before_serve_returns_immediately() {
        let server = HttpServer::with_router(settings(0), Router::new(), Span::none()).unwrap();
        server.shutdown(None).await.unwrap();
        server.serve().await.unwrap();
        assert_eq!(server.state(), ServerState::Idle);
    }

    #[tokio::test]
    async fn bind_failure_is_reported() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let server = HttpServer::with_router(settings(port), Router::new(), Span::none()).unwrap();

        let err = server.serve().await.unwrap_err();
        assert!(matches!(err, ServeError::Bind { .. }));
        assert_eq!(server.state(), ServerState::Idle);
        server.shutdown(Some(Duration::from_millis(100))).await.unwrap();
    }

    #[tokio::test]
    async fn serve_then_shutdown() {
        let server = Arc::new(
            HttpServer::with_router(
                settings(0),
                Router::new().route("/svc/health", get(health_handler)),
                Span::none(),
            )
            .unwrap(),
        );
        let serving = tokio::spawn({
            let server = Arc::clone(&server);
            async move { server.serve().await }
        });

        let addr = wait_serving(&server).await;
        assert_eq!(server.local_addr(), Some(addr));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /svc/health HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.to_ascii_lowercase().contains("x-request-id"));
        assert!(response.contains("healthy"));

        server.shutdown(None).await.unwrap();
        serving.await.unwrap().unwrap();
        assert_eq!(server.state(), ServerState::Stopped);
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(30)).await;
        "late"
    }

    type Serving = tokio::task::JoinHandle<Result<(), ServeError>>;

    /// Server with one request parked in a handler that never finishes.
    async fn spawn_slow_server() -> (Arc<HttpServer>, Serving, TcpStream) {
        let server = Arc::new(
            HttpServer::with_router(
                settings(0),
                Router::new().route("/svc/slow", get(slow)),
                Span::none(),
            )
            .unwrap(),
        );
        let serving = tokio::spawn({
            let server = Arc::clone(&server);
            async move { server.serve().await }
        });
        let addr = wait_serving(&server).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /svc/slow HTTP/1.1\r\nHost: test\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        (server, serving, stream)
    }

    async fn read_head(stream: &mut TcpStream) -> String {
        let mut buf = [0u8; 512];
        let n = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf))
            .await
            .unwrap()
            .unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[tokio::test]
    async fn shutdown_deadline_aborts_request_in_flight() {
        let (server, serving, mut stream) = spawn_slow_server().await;

        let started = std::time::Instant::now();
        let err = server
            .shutdown(Some(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, ShutdownError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(2));

        // The accept loop has exited by the time shutdown returns.
        assert_eq!(server.state(), ServerState::Stopped);
        serving.await.unwrap().unwrap();

        assert!(read_head(&mut stream).await.starts_with("HTTP/1.1 503"));
    }

    #[tokio::test]
    async fn force_stop_cuts_unbounded_drain() {
        let (server, serving, mut stream) = spawn_slow_server().await;

        let draining = tokio::spawn({
            let server = Arc::clone(&server);
            async move { server.shutdown(None).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!draining.is_finished());

        server.force_stop().await.unwrap();
        assert_eq!(server.state(), ServerState::Stopped);
        draining.await.unwrap().unwrap();
        serving.await.unwrap().unwrap();

        assert!(read_head(&mut stream).await.starts_with("HTTP/1.1 503"));
    }

    #[tokio::test]
    async fn unknown_path_gets_json_not_found() {
        let server = Arc::new(
            HttpServer::with_router(
                settings(0),
                Router::new().route("/svc/health", get(health_handler)),
                Span::none(),
            )
            .unwrap(),
        );
        let serving = tokio::spawn({
            let server = Arc::clone(&server);
            async move { server.serve().await }
        });
        let addr = wait_serving(&server).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /svc/missing HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.contains("application/json"));
        assert!(response.contains("\"errors\""));
        assert!(response.contains("path not found"));

        server.shutdown(None).await.unwrap();
        serving.await.unwrap().unwrap();
    }
}
