//! HTTP request handlers.
//!
//! Handlers are thin: extract identity and input, call the lifecycle
//! controller or statistics aggregator, map the result. All
//! authorization decisions live in the domain layer, not here.

pub mod applications;
pub mod audit;
pub mod health;
pub mod notifications;
pub mod statistics;
