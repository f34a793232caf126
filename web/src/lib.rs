//! # Janseva Web
//!
//! The Axum HTTP surface of the Janseva service portal, exposing the
//! application lifecycle, notification self-service, statistics and the
//! audit log over JSON.
//!
//! # Request flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Identity** is extracted from the trusted gateway headers
//! 3. The handler builds a `RequestContext` and calls the
//!    `LifecycleService` or `StatisticsAggregator`
//! 4. Domain errors map onto HTTP statuses through [`AppError`]
//!
//! Handlers carry no business rules; authorization, transition legality
//! and audit all live in the domain layer.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod pagination;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use extractors::{ClientIp, Identity};
pub use routes::router;
pub use state::AppState;
