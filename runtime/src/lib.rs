//! # Janseva Runtime
//!
//! The imperative shell around [`janseva_core`]: store implementations,
//! the lifecycle controller that orchestrates them, and the statistics
//! aggregator with its live subscription feed.
//!
//! ## Core components
//!
//! - [`memory`]: in-memory implementations of the core store traits with
//!   per-record optimistic concurrency
//! - [`feed`]: broadcast change feed published after every committed
//!   application mutation
//! - [`lifecycle`]: [`LifecycleService`](lifecycle::LifecycleService),
//!   the single entry point for submissions, status transitions, reads
//!   and notification self-service
//! - [`stats`]: pull snapshots and push subscriptions over the record set
//!
//! ## Unit-of-work semantics
//!
//! A status mutation is one logical unit: record write, audit append,
//! then a best-effort notification. Audit failure aborts the operation
//! and compensates the record write; notification failure is logged and
//! swallowed. See the module docs on [`lifecycle`] for the exact
//! ordering.

pub mod feed;
pub mod lifecycle;
pub mod memory;
pub mod stats;

pub use feed::{ApplicationChange, ChangeFeed};
pub use lifecycle::{LifecycleService, NewApplication, RequestContext, StatusView};
pub use memory::{InMemoryApplicationStore, InMemoryAuditLog, InMemoryNotificationStore};
pub use stats::{StatisticsAggregator, StatisticsScope, StatisticsSnapshot, SubscriptionHandle};
