//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - First signal cancels the lifecycle (graceful shutdown)
//! - Any later signal forces it (drain is cut short)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered before the listener task is spawned so a
//!   registration failure is reported to the caller
//! - The listener keeps running after the first signal; it exits once the
//!   lifecycle is forced

use tokio::task::JoinHandle;

use crate::lifecycle::context::{CancelReason, Lifecycle};

/// Effect of one termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    Cancelled,
    Forced,
}

/// Apply a termination signal: cancel a running lifecycle, force one that is
/// already shutting down.
pub fn escalate(lifecycle: &Lifecycle, name: &'static str) -> Escalation {
    if lifecycle.is_cancelled() {
        tracing::warn!(signal = name, "repeated termination signal; forcing shutdown");
        lifecycle.force(CancelReason::Signal(name));
        Escalation::Forced
    } else {
        tracing::info!(signal = name, "termination signal received");
        lifecycle.cancel(CancelReason::Signal(name));
        Escalation::Cancelled
    }
}

/// Spawn a task that relays termination signals to `lifecycle`.
#[cfg(unix)]
pub fn spawn_listener(lifecycle: Lifecycle) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                _ = interrupt.recv() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
                _ = lifecycle.forced() => return,
            };
            if escalate(&lifecycle, name) == Escalation::Forced {
                return;
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_listener(lifecycle: Lifecycle) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "failed to listen for ctrl-c");
                        return;
                    }
                }
                _ = lifecycle.forced() => return,
            }
            if escalate(&lifecycle, "ctrl-c") == Escalation::Forced {
                return;
            }
        }
    }))
}
