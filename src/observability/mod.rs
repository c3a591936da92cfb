//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All components produce:
//!     → logging.rs (structured log events inside component spans)
//!
//! HTTP requests:
//!     → tower_http TraceLayer (request/response spans)
//!     → x-request-id set and propagated per request
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through request spans and responses

pub mod logging;

pub use logging::Logger;
