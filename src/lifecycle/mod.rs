//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     first SIGTERM/SIGINT → cancel Lifecycle (context.rs)
//!     later SIGTERM/SIGINT → force Lifecycle
//!
//! Startup (startup.rs):
//!     Resolve entry point via Graph → advance to Serving → HttpServer::serve
//!
//! Shutdown (shutdown.rs):
//!     Lifecycle canceled → wait for boot to settle
//!         → HttpServer::shutdown (or force_stop once forced)
//!         → close pool → done
//!
//! Runtime (runtime.rs):
//!     TaskGroup { startup, shutdown } → first error → RunError
//! ```
//!
//! # Design Decisions
//! - Two tasks share one cancellation context; the first failure cancels it
//! - Ordered shutdown: stop accepting, drain, close the pool
//! - Drain deadline is optional; on expiry open requests are aborted and the
//!   server stops before the pool is closed

pub mod context;
pub mod runtime;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod task_group;

pub use context::{CancelReason, Lifecycle};
pub use runtime::{Milestone, Phase, RunConfig, RunError, Runtime};
pub use task_group::TaskGroup;
