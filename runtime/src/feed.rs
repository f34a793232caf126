//! Change feed for application record mutations.
//!
//! Every committed insert, update or removal publishes an
//! [`ApplicationChange`] on a broadcast channel. The statistics
//! aggregator subscribes to this feed to know *when* to recompute; the
//! events deliberately carry no counters, so a lagged or dropped event
//! can never corrupt an aggregate - subscribers always recompute from
//! the full record set.

use janseva_core::{ApplicationId, ApplicationStatus, UserId};
use tokio::sync::broadcast;

/// A committed mutation to the application record set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplicationChange {
    /// The record that changed.
    pub id: ApplicationId,
    /// The record's applicant, for user-scoped subscribers.
    pub applicant: UserId,
    /// The record's status after the mutation.
    pub status: ApplicationStatus,
}

/// Broadcast fan-out of [`ApplicationChange`] events.
///
/// Cheap to clone; all clones share the same channel.
#[derive(Clone, Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ApplicationChange>,
}

impl ChangeFeed {
    /// Default buffered event capacity per receiver.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a feed with the given per-receiver buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a change to all current subscribers.
    ///
    /// Publishing with no subscribers is not an error; the record store
    /// is the source of truth either way.
    pub fn publish(&self, change: ApplicationChange) {
        if self.sender.send(change).is_err() {
            tracing::trace!(application_id = %change.id, "change published with no subscribers");
        }
    }

    /// Opens a new subscription starting from now.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApplicationChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
