//! svckit service binary.
//!
//! # Startup
//!
//! ```text
//! parse CLI → load config (file + env) → seed Graph
//!     → Runtime::run(entry)  ── SIGINT/SIGTERM ──▶ ordered shutdown
//! ```
//!
//! Exit code is 0 after a clean shutdown and 1 on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use svckit::config;
use svckit::graph::{EntryPoint, Graph, GraphSeed};
use svckit::lifecycle::{RunConfig, Runtime};

#[derive(Parser)]
#[command(name = "svckit")]
#[command(about = "Boot a service entry point and supervise it until shutdown", long_about = None)]
struct Cli {
    /// Configuration file. A missing file falls back to defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Entry point to run.
    #[arg(short, long, default_value = "http")]
    entry: String,

    /// Bound on draining in-flight requests during shutdown.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    shutdown_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let entry = match cli.entry.parse::<EntryPoint>() {
        Ok(entry) => entry,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let app_config = match config::load_configuration(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config load error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let shutdown_timeout = cli
        .shutdown_timeout_secs
        .or(app_config.http.server.shutdown_timeout_secs)
        .map(Duration::from_secs);

    let graph = Arc::new(Graph::new(GraphSeed::with_config(app_config)));
    let runtime = Runtime::new(Arc::clone(&graph));
    let conf = RunConfig::new(entry).with_shutdown_timeout(shutdown_timeout);

    match runtime.run(conf).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // `run` logged the error; repeat it when logs are not shown.
            if !graph.logging_active() {
                eprintln!("application run error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
