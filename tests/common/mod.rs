//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use svckit::config::AppConfig;
use svckit::graph::{Graph, GraphSeed};
use svckit::lifecycle::{Phase, Runtime};

/// Config that binds an ephemeral loopback port and logs nothing.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.http.server.host = "127.0.0.1".to_string();
    config.http.server.port = 0;
    config.http.router.namespace = "svc".to_string();
    config.logger.enabled = false;
    config
}

pub fn seeded_graph(config: AppConfig) -> Arc<Graph> {
    Arc::new(Graph::new(GraphSeed::with_config(config)))
}

/// Bind a loopback port and keep it held for the lifetime of the listener.
pub fn occupy_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Wait until the runtime reaches `phase`, panicking after `limit`.
pub async fn wait_for_phase(runtime: &Runtime, phase: Phase, limit: Duration) {
    let mut rx = runtime.subscribe_phase();
    tokio::time::timeout(limit, rx.wait_for(|p| *p >= phase))
        .await
        .expect("phase not reached in time")
        .expect("phase channel closed");
}

/// A TCP endpoint that accepts connections and never answers, standing in
/// for an unresponsive database. Sockets stay open until the runtime exits.
pub async fn silent_endpoint() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    port
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
