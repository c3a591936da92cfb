//! Resolution tests for the component graph.

use std::sync::Arc;

use svckit::graph::{Component, EntryPoint, Graph, GraphError, GraphSeed};

mod common;

#[tokio::test]
async fn accessors_return_the_same_instance() {
    let graph = common::seeded_graph(common::test_config());

    assert!(Arc::ptr_eq(&graph.config().await.unwrap(), &graph.config().await.unwrap()));
    assert!(Arc::ptr_eq(&graph.metadata().await.unwrap(), &graph.metadata().await.unwrap()));
    assert!(Arc::ptr_eq(&graph.logger().await.unwrap(), &graph.logger().await.unwrap()));
    assert!(Arc::ptr_eq(&graph.db_pool().await.unwrap(), &graph.db_pool().await.unwrap()));
    assert!(Arc::ptr_eq(
        &graph.query_handler().await.unwrap(),
        &graph.query_handler().await.unwrap()
    ));
    assert!(Arc::ptr_eq(
        &graph.example_controller().await.unwrap(),
        &graph.example_controller().await.unwrap()
    ));
    assert!(Arc::ptr_eq(
        &graph.http_server().await.unwrap(),
        &graph.http_server().await.unwrap()
    ));
}

#[tokio::test]
async fn shared_dependency_is_constructed_once() {
    let graph = common::seeded_graph(common::test_config());

    let pool = graph.db_pool().await.unwrap();
    graph.example_repo().await.unwrap();
    graph.example_controller().await.unwrap();

    assert_eq!(graph.construction_count(Component::DbPool), 1);
    assert_eq!(graph.construction_count(Component::Logger), 1);
    assert!(Arc::ptr_eq(&pool, &graph.peek_db_pool().unwrap()));
}

#[tokio::test]
async fn unknown_entry_point_constructs_nothing() {
    for token in ["grpc", "cli", "", "HTTP", "worker"] {
        let graph = common::seeded_graph(common::test_config());
        let err = graph.load_token(token).await.unwrap_err();

        assert!(matches!(&err, GraphError::UnknownEntryPoint(t) if t == token));
        assert!(graph.constructed().is_empty(), "token {token:?} built components");
        assert!(graph.peek_db_pool().is_none());
    }
}

#[tokio::test]
async fn http_entry_point_builds_the_full_set() {
    let graph = common::seeded_graph(common::test_config());
    let entry = graph.load_token("http").await.unwrap();
    assert_eq!(entry, EntryPoint::HttpServer);

    let built = graph.constructed();
    for component in [
        Component::Metadata,
        Component::Logger,
        Component::DbPool,
        Component::QueryHandler,
        Component::ExampleRepository,
        Component::ExampleService,
        Component::ExampleController,
        Component::HttpServer,
    ] {
        assert_eq!(
            built.iter().filter(|c| **c == component).count(),
            1,
            "{component} constructed other than once"
        );
    }
    assert_eq!(built.last(), Some(&Component::HttpServer));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_builds_one_pool() {
    let graph = common::seeded_graph(common::test_config());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let graph = Arc::clone(&graph);
        handles.push(tokio::spawn(async move { graph.db_pool().await.unwrap() }));
    }

    let mut pools = Vec::new();
    for handle in handles {
        pools.push(handle.await.unwrap());
    }

    assert_eq!(graph.construction_count(Component::DbPool), 1);
    assert!(pools.iter().all(|p| Arc::ptr_eq(p, &pools[0])));
}

#[tokio::test]
async fn invalid_postgres_section_fails_pool_construction() {
    let mut config = common::test_config();
    config.postgres.host = String::new();
    let graph = common::seeded_graph(config);

    let err = graph.example_repo().await.unwrap_err();
    assert_eq!(err.component(), Some(Component::DbPool));
    assert!(err.to_string().starts_with("postgres client load error"));
    assert!(graph.peek_db_pool().is_none());
    assert_eq!(graph.construction_count(Component::ExampleRepository), 0);

    // The failed slot stays empty, so a later call retries and fails again.
    assert!(graph.db_pool().await.is_err());
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn config_is_loaded_from_file_once() {
    let file = config_file(
        r#"
[http.router]
namespace = "files"

[http.server]
host = "127.0.0.1"
port = 0

[logger]
enabled = false
"#,
    );
    let graph = Graph::new(GraphSeed {
        config_path: Some(file.path().to_path_buf()),
        ..GraphSeed::default()
    });

    let first = graph.config().await.unwrap();
    let second = graph.config().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.http.router.namespace, "files");
    assert_eq!(graph.construction_count(Component::Config), 1);

    // Dependents read the loaded file, not defaults.
    graph.http_server().await.unwrap();
    assert_eq!(graph.construction_count(Component::Config), 1);
}

#[tokio::test]
async fn invalid_config_file_fails_the_config_slot() {
    let file = config_file("[http.router]\nnamespace = \"\"\n");
    let graph = Graph::new(GraphSeed {
        config_path: Some(file.path().to_path_buf()),
        ..GraphSeed::default()
    });

    let err = graph.http_server().await.unwrap_err();
    assert!(matches!(err, GraphError::Construction { .. }), "{err}");
    assert_eq!(err.component(), Some(Component::Config));
    assert_eq!(graph.construction_count(Component::Config), 0);
    assert!(graph.peek_http_server().is_none());
}
