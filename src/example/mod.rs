//! Example resource module.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → controller.rs (extract, resolve list query)
//!     → service.rs (validate input, log failures)
//!     → repository.rs (SQL over the shared pool)
//!     → entity.rs (row → API resource)
//! ```

pub mod controller;
pub mod entity;
pub mod repository;
pub mod service;

pub use controller::ExampleController;
pub use repository::ExampleRepository;
pub use service::ExampleService;
