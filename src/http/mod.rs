//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace middleware)
//!     → base / health handlers, or example controller
//!     → response.rs (envelopes, error bodies)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::{HttpServer, ServeError, ServerSettings, ServerState, ShutdownError};
