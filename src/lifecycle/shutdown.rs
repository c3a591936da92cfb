//! Shutdown coordination.
//!
//! # Responsibilities
//! - Wait for the lifecycle to be canceled
//! - Stop the HTTP server, then close the pool
//!
//! # Design Decisions
//! - Ordered: the server has stopped before the pool is closed, even when the
//!   drain deadline passes or shutdown is forced
//! - Only components that were actually built are torn down; slots are
//!   peeked, never resolved
//! - A server shutdown failure is reported but does not skip pool close
//! - Forcing the lifecycle during the drain aborts open requests at once

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::graph::Graph;
use crate::http::{ServerState, ShutdownError};
use crate::lifecycle::context::Lifecycle;
use crate::lifecycle::runtime::{Journal, Milestone, Phase, RunError};

pub(crate) async fn await_and_shutdown(
    graph: Arc<Graph>,
    lifecycle: Lifecycle,
    boot_settled: CancellationToken,
    deadline: Option<Duration>,
    journal: Arc<Journal>,
) -> Result<(), RunError> {
    lifecycle.cancelled().await;
    journal.advance(Phase::ShuttingDown);

    let span = graph
        .peek_logger()
        .map(|logger| logger.root().clone())
        .unwrap_or_else(tracing::Span::none);

    async move {
        if let Some(reason) = lifecycle.reason() {
            tracing::debug!(reason = %reason, "lifecycle canceled");
        }
        journal.milestone(Milestone::ShutdownInitiated);

        // Construction in flight finishes before anything is torn down.
        boot_settled.cancelled().await;

        let mut first_error = None;

        if let Some(server) = graph.peek_http_server() {
            let outcome = tokio::select! {
                biased;
                _ = lifecycle.forced() => {
                    tracing::warn!("shutdown forced; aborting open requests");
                    server.force_stop().await.and(Err(ShutdownError::Forced))
                }
                outcome = server.shutdown(deadline) => outcome,
            };
            if let Err(e) = outcome {
                tracing::error!(error = %e, "http server shutdown failed");
                first_error = Some(RunError::Shutdown(e));
            }
            if !matches!(server.state(), ServerState::Serving(_)) {
                journal.milestone(Milestone::ServerShutDown);
            }
        }

        if let Some(pool) = graph.peek_db_pool() {
            pool.close().await;
            journal.milestone(Milestone::PoolClosed);
        }

        journal.milestone(Milestone::ShutdownComplete);
        first_error.map_or(Ok(()), Err)
    }
    .instrument(span)
    .await
}
