//! Lifecycle context shared by the supervised tasks.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::lifecycle::signals;

/// Why the lifecycle was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// An OS termination signal (`SIGINT`, `SIGTERM`).
    Signal(&'static str),
    /// A supervised task returned an error or panicked.
    TaskFailed,
    /// Canceled programmatically.
    Requested,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Signal(name) => write!(f, "signal {}", name),
            CancelReason::TaskFailed => f.write_str("task failure"),
            CancelReason::Requested => f.write_str("requested"),
        }
    }
}

/// Cancellation signal coordinating the serve and shutdown tasks.
///
/// Cancels at most once. Only the first reason is kept; later calls are
/// no-ops. Forcing escalates a cancellation: the drain is cut short and open
/// requests are dropped.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    token: CancellationToken,
    force: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle canceled by `SIGINT` or `SIGTERM`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_os_signals() -> std::io::Result<Self> {
        let lifecycle = Self::new();
        signals::spawn_listener(lifecycle.clone())?;
        Ok(lifecycle)
    }

    /// Cancel with `reason`. Returns `true` for the call that canceled.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        let first = self.reason.set(reason).is_ok();
        self.token.cancel();
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    /// Resolves once canceled; immediately if already canceled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Cancel (if not yet canceled) and stop waiting for in-flight work.
    pub fn force(&self, reason: CancelReason) {
        self.cancel(reason);
        self.force.cancel();
    }

    pub fn is_forced(&self) -> bool {
        self.force.is_cancelled()
    }

    /// Resolves once forced.
    pub async fn forced(&self) {
        self.force.cancelled().await
    }
}
