//! Statistics aggregation: pull snapshots and push subscriptions.
//!
//! Snapshots are recomputed from the full record set on every request
//! (and on every relevant change-feed event for subscribers). Nothing is
//! incrementally accumulated, so the aggregates cannot drift from the
//! records they summarize. The scan is O(n) and documented as a batch
//! job off the request path for production-scale record sets.

use crate::feed::ChangeFeed;
use janseva_core::catalog::ServiceCatalog;
use janseva_core::error::LifecycleError;
use janseva_core::stats::{self, SystemStatistics, UserStatistics};
use janseva_core::store::ApplicationStore;
use janseva_core::types::UserId;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// What a subscription (or snapshot request) covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatisticsScope {
    /// System-wide aggregates.
    System,
    /// One user's aggregates.
    User(UserId),
}

impl StatisticsScope {
    /// Whether a change to `applicant`'s record is relevant to this
    /// scope.
    #[must_use]
    pub fn covers(self, applicant: UserId) -> bool {
        match self {
            Self::System => true,
            Self::User(user) => user == applicant,
        }
    }
}

/// A freshly computed snapshot, tagged with its scope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum StatisticsSnapshot {
    /// System-wide aggregates.
    System(SystemStatistics),
    /// One user's aggregates.
    User(UserStatistics),
}

/// Callback invoked with each fresh snapshot.
pub type SnapshotCallback = Box<dyn Fn(StatisticsSnapshot) + Send + Sync>;

/// Cancellation handle for a live statistics subscription.
///
/// Cancelling is idempotent; dropping the handle cancels too. After
/// cancellation the callback is never invoked again.
#[derive(Debug)]
pub struct SubscriptionHandle {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stops the subscription. Safe to call more than once.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    /// Whether the subscription has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Derives aggregate counters from the application record set.
///
/// Exposes both pull ([`Self::system_snapshot`], [`Self::user_snapshot`])
/// and push ([`Self::subscribe`]) interfaces.
pub struct StatisticsAggregator {
    applications: Arc<dyn ApplicationStore>,
    catalog: Arc<ServiceCatalog>,
    feed: ChangeFeed,
}

impl StatisticsAggregator {
    /// Creates an aggregator over the given record store, recomputing on
    /// events from `feed`.
    #[must_use]
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        catalog: Arc<ServiceCatalog>,
        feed: ChangeFeed,
    ) -> Self {
        Self {
            applications,
            catalog,
            feed,
        }
    }

    /// Computes the system-wide snapshot.
    ///
    /// # Errors
    ///
    /// `Dependency` when the record store is unavailable.
    pub async fn system_snapshot(&self) -> Result<SystemStatistics, LifecycleError> {
        let records = self
            .applications
            .all()
            .await
            .map_err(|e| LifecycleError::dependency(format!("application store: {e}")))?;
        Ok(stats::system_statistics(&records, self.catalog.len()))
    }

    /// Computes one user's snapshot.
    ///
    /// # Errors
    ///
    /// `Dependency` when the record store is unavailable.
    pub async fn user_snapshot(&self, user: UserId) -> Result<UserStatistics, LifecycleError> {
        let records = self
            .applications
            .all()
            .await
            .map_err(|e| LifecycleError::dependency(format!("application store: {e}")))?;
        Ok(stats::user_statistics(&records, user))
    }

    async fn snapshot(&self, scope: StatisticsScope) -> Result<StatisticsSnapshot, LifecycleError> {
        match scope {
            StatisticsScope::System => self.system_snapshot().await.map(StatisticsSnapshot::System),
            StatisticsScope::User(user) => {
                self.user_snapshot(user).await.map(StatisticsSnapshot::User)
            }
        }
    }

    /// Opens a live subscription.
    ///
    /// The callback fires once immediately with the current snapshot (no
    /// wait-for-first-change gap), then again after every change-feed
    /// event relevant to `scope`. A lagged receiver triggers a full
    /// recompute, so missed events never produce a stale aggregate.
    #[must_use]
    pub fn subscribe(
        self: &Arc<Self>,
        scope: StatisticsScope,
        callback: SnapshotCallback,
    ) -> SubscriptionHandle {
        let aggregator = Arc::clone(self);
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_in_task = Arc::clone(&cancelled);
        let mut receiver = self.feed.subscribe();

        let task = tokio::spawn(async move {
            match aggregator.snapshot(scope).await {
                Ok(snapshot) => callback(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to compute initial statistics snapshot");
                }
            }

            loop {
                let relevant = match receiver.recv().await {
                    Ok(change) => scope.covers(change.applicant),
                    // Missed events: the full recompute below covers them.
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "statistics subscriber lagged; recomputing");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
                if !relevant || cancelled_in_task.load(Ordering::SeqCst) {
                    continue;
                }
                match aggregator.snapshot(scope).await {
                    Ok(snapshot) => callback(snapshot),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to recompute statistics snapshot");
                    }
                }
            }
        });

        SubscriptionHandle { cancelled, task }
    }
}
