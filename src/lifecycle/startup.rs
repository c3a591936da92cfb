//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the entry point's component set through the graph
//! - Hand off to the accept loop once boot has settled
//!
//! # Design Decisions
//! - Fail fast: any construction error fails the task, which cancels the
//!   lifecycle and lets the shutdown task tear down what was built
//! - This is the only task that constructs components
//! - `boot_settled` is canceled as soon as construction ends (success,
//!   failure or early exit) so the shutdown task never inspects the graph
//!   mid-construction

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::graph::{EntryPoint, Graph};
use crate::lifecycle::context::Lifecycle;
use crate::lifecycle::runtime::{Journal, Phase, RunError};

pub(crate) async fn boot_and_serve(
    graph: Arc<Graph>,
    entry: EntryPoint,
    lifecycle: Lifecycle,
    boot_settled: CancellationToken,
    journal: Arc<Journal>,
) -> Result<(), RunError> {
    let settled = boot_settled.drop_guard();

    if lifecycle.is_cancelled() {
        tracing::info!("lifecycle canceled before boot; skipping");
        return Ok(());
    }
    journal.advance(Phase::Booting);

    graph.load(entry).await.map_err(RunError::Boot)?;
    let server = graph.http_server().await.map_err(RunError::Boot)?;
    drop(settled);

    let span = graph
        .peek_logger()
        .map(|logger| logger.root().clone())
        .unwrap_or_else(tracing::Span::none);

    async move {
        if lifecycle.is_cancelled() {
            tracing::info!(entry = %entry, "lifecycle canceled during boot; not serving");
            return Ok(());
        }
        tracing::info!(entry = %entry, "boot complete");
        journal.advance(Phase::Serving);

        server.serve().await.map_err(RunError::Serve)
    }
    .instrument(span)
    .await
}
