//! Application state for Axum handlers.

use janseva_core::catalog::ServiceCatalog;
use janseva_core::environment::SystemClock;
use janseva_runtime::{
    ChangeFeed, InMemoryApplicationStore, InMemoryAuditLog, InMemoryNotificationStore,
    LifecycleService, StatisticsAggregator,
};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The lifecycle controller behind every application operation.
    pub lifecycle: Arc<LifecycleService>,
    /// Aggregate statistics over the application record set.
    pub statistics: Arc<StatisticsAggregator>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(lifecycle: Arc<LifecycleService>, statistics: Arc<StatisticsAggregator>) -> Self {
        Self {
            lifecycle,
            statistics,
        }
    }

    /// Wires up a state backed by fresh in-memory stores and the default
    /// service catalog.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_feed_capacity(ChangeFeed::DEFAULT_CAPACITY)
    }

    /// Same as [`Self::in_memory`] with an explicit change-feed buffer
    /// capacity.
    #[must_use]
    pub fn with_feed_capacity(feed_capacity: usize) -> Self {
        let feed = ChangeFeed::new(feed_capacity);
        let applications = Arc::new(InMemoryApplicationStore::new(feed.clone()));
        let audit = Arc::new(InMemoryAuditLog::default());
        let notifications = Arc::new(InMemoryNotificationStore::default());
        let catalog = Arc::new(ServiceCatalog::with_defaults());

        let lifecycle = Arc::new(LifecycleService::new(
            Arc::clone(&applications) as _,
            audit,
            notifications,
            Arc::clone(&catalog),
            Arc::new(SystemClock),
        ));
        let statistics = Arc::new(StatisticsAggregator::new(
            applications as _,
            catalog,
            feed,
        ));

        Self::new(lifecycle, statistics)
    }
}
