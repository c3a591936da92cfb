//! Runtime supervisor.
//!
//! # Responsibilities
//! - Own the lifecycle context for one run
//! - Run the boot-and-serve task and the shutdown task as one group
//! - Publish the run phase and record teardown milestones
//! - Wrap and log the first task error
//!
//! # State Transitions
//! ```text
//! Idle → Booting:           boot task started
//! Booting → Serving:        entry point loaded, accept loop about to start
//! * → ShuttingDown:         lifecycle canceled (signal or task failure)
//! ShuttingDown → Terminated: server stopped, pool closed
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use crate::graph::{EntryPoint, Graph, GraphError};
use crate::http::{ServeError, ShutdownError};
use crate::lifecycle::context::Lifecycle;
use crate::lifecycle::task_group::TaskGroup;
use crate::lifecycle::{shutdown, startup};

/// Run phase. Ordered; the published phase never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle,
    Booting,
    Serving,
    ShuttingDown,
    Terminated,
}

/// Teardown milestones, recorded in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    ShutdownInitiated,
    ServerShutDown,
    PoolClosed,
    ShutdownComplete,
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Milestone::ShutdownInitiated => "shutdown initiated",
            Milestone::ServerShutDown => "http server shut down",
            Milestone::PoolClosed => "db connection pool closed",
            Milestone::ShutdownComplete => "shutdown complete",
        })
    }
}

/// What to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub entry: EntryPoint,
    /// Bound on server drain. `None` waits for in-flight requests.
    pub shutdown_timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new(entry: EntryPoint) -> Self {
        Self {
            entry,
            shutdown_timeout: None,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Error returned by [`Runtime::run`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error("boot failed: {0}")]
    Boot(#[source] GraphError),

    #[error("serve failed: {0}")]
    Serve(#[source] ServeError),

    #[error("shutdown failed: {0}")]
    Shutdown(#[source] ShutdownError),

    #[error("supervised task aborted: {0}")]
    Task(#[from] JoinError),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}

/// Phase and milestone record for one runtime.
#[derive(Debug)]
pub(crate) struct Journal {
    phase: watch::Sender<Phase>,
    milestones: Mutex<Vec<Milestone>>,
}

impl Journal {
    fn new() -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            phase,
            milestones: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn advance(&self, next: Phase) {
        self.phase.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });
    }

    pub(crate) fn milestone(&self, milestone: Milestone) {
        tracing::info!("{}", milestone);
        self.milestones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(milestone);
    }
}

/// Supervises one boot-serve-shutdown cycle over a [`Graph`].
#[derive(Debug, Clone)]
pub struct Runtime {
    graph: Arc<Graph>,
    journal: Arc<Journal>,
}

impl Runtime {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            journal: Arc::new(Journal::new()),
        }
    }

    /// Run until SIGINT or SIGTERM, or until a task fails.
    pub async fn run(&self, conf: RunConfig) -> Result<(), RunError> {
        let lifecycle = Lifecycle::with_os_signals().map_err(RunError::Signals)?;
        self.run_with(conf, lifecycle).await
    }

    /// Run under an externally owned lifecycle.
    pub async fn run_with(&self, conf: RunConfig, lifecycle: Lifecycle) -> Result<(), RunError> {
        let boot_settled = CancellationToken::new();
        let mut group = TaskGroup::<RunError>::new(lifecycle.clone());

        group.spawn(
            "boot",
            startup::boot_and_serve(
                Arc::clone(&self.graph),
                conf.entry,
                lifecycle.clone(),
                boot_settled.clone(),
                Arc::clone(&self.journal),
            ),
        );
        group.spawn(
            "shutdown",
            shutdown::await_and_shutdown(
                Arc::clone(&self.graph),
                lifecycle,
                boot_settled,
                conf.shutdown_timeout,
                Arc::clone(&self.journal),
            ),
        );

        let result = group.wait().await;
        self.journal.advance(Phase::Terminated);

        if let Err(e) = &result {
            tracing::error!(error = %e, "application run error");
        }
        result
    }

    pub fn phase(&self) -> Phase {
        *self.journal.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.journal.phase.subscribe()
    }

    pub fn milestones(&self) -> Vec<Milestone> {
        self.journal
            .milestones
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_never_regresses() {
        let journal = Journal::new();
        journal.advance(Phase::Booting);
        journal.advance(Phase::ShuttingDown);
        journal.advance(Phase::Serving);
        assert_eq!(*journal.phase.borrow(), Phase::ShuttingDown);
    }

    #[test]
    fn milestone_names() {
        assert_eq!(Milestone::ShutdownInitiated.to_string(), "shutdown initiated");
        assert_eq!(Milestone::ServerShutDown.to_string(), "http server shut down");
        assert_eq!(Milestone::PoolClosed.to_string(), "db connection pool closed");
        assert_eq!(Milestone::ShutdownComplete.to_string(), "shutdown complete");
    }

    #[test]
    fn run_config_defaults_to_no_deadline() {
        let conf = RunConfig::new(EntryPoint::HttpServer);
        assert_eq!(conf.shutdown_timeout, None);
        let conf = conf.with_shutdown_timeout(Some(Duration::from_secs(3)));
        assert_eq!(conf.shutdown_timeout, Some(Duration::from_secs(3)));
    }
}
