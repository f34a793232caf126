//! Storage traits for the lifecycle core.
//!
//! One collection per entity (applications, audit log, notifications),
//! each behind its own async trait. The application store implements
//! optimistic concurrency: every record carries a [`Version`] counting
//! committed mutations, and an update with a stale expected version is
//! refused with [`StoreError::VersionConflict`]. That check is the
//! storage-level half of the per-record serialization guarantee; the
//! controller supplies the transition-legality half.
//!
//! Implementations must be `Send + Sync`; every method is a potential
//! suspension point and none may block unboundedly.

use crate::types::{
    ApplicationId, ApplicationRecord, AuditAction, AuditLogEntry, Notification, NotificationId,
    UserId,
};
use crate::ApplicationStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Versions
// ============================================================================

/// Monotonic per-record version for optimistic concurrency control.
///
/// Starts at 1 when a record is inserted and increments on every
/// committed update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly inserted record.
    pub const INITIAL: Self = Self(1);

    /// Creates a version from a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The version after one more committed mutation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict: expected version doesn't match
    /// the record's current version. Another request committed first.
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// The version the caller read before mutating.
        expected: Version,
        /// The record's actual current version.
        actual: Version,
    },

    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The requester does not own the record they tried to mutate.
    #[error("not the owner of record {0}")]
    NotOwner(String),

    /// The backing store is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// Pagination
// ============================================================================

/// Cursor into a `created_at`-descending listing.
///
/// The id tie-break keeps the ordering total, so paging is restartable
/// and stable across calls even when timestamps collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    /// `created_at` of the last item the caller has seen.
    pub created_at: DateTime<Utc>,
    /// Id of the last item the caller has seen.
    pub id: Uuid,
}

/// A page request: how many items, and where the last page ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of items to return.
    pub limit: usize,
    /// Resume after this cursor; `None` starts from the newest item.
    pub cursor: Option<PageCursor>,
}

impl PageRequest {
    /// Default page size when the caller does not specify one.
    pub const DEFAULT_LIMIT: usize = 20;

    /// First page with the given limit.
    #[must_use]
    pub const fn first(limit: usize) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// One page of results, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Cursor to resume from, `None` when the listing is exhausted.
    pub next_cursor: Option<PageCursor>,
}

impl<T> Page<T> {
    /// An empty, exhausted page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Filter for application listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    /// Restrict to one applicant (forced for citizen callers).
    pub applicant: Option<UserId>,
    /// Restrict to one status.
    pub status: Option<ApplicationStatus>,
}

/// Filter for audit log queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Restrict to one action.
    pub action: Option<AuditAction>,
    /// Restrict to one actor.
    pub actor: Option<UserId>,
    /// Restrict to entries about one resource.
    pub resource_id: Option<String>,
}

// ============================================================================
// Traits
// ============================================================================

/// Store for application records, with per-record optimistic concurrency.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Inserts a brand-new record, returning its initial version.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store failure; inserting an id that already
    /// exists is a caller bug and also reported as `Unavailable`.
    async fn insert(&self, record: ApplicationRecord) -> Result<Version, StoreError>;

    /// Loads a record together with its current version.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record has this id.
    async fn get(&self, id: ApplicationId)
    -> Result<(Version, ApplicationRecord), StoreError>;

    /// Replaces a record if and only if it is still at `expected`.
    ///
    /// Returns the new version on success. This is the single mutation
    /// path for existing records; the read-check-write cycle in the
    /// controller is made atomic by the version check here.
    ///
    /// # Errors
    ///
    /// `VersionConflict` when another writer committed first; `NotFound`
    /// when the record vanished.
    async fn update(
        &self,
        id: ApplicationId,
        expected: Version,
        record: ApplicationRecord,
    ) -> Result<Version, StoreError>;

    /// Removes a record outright.
    ///
    /// Exists solely as the compensation hook for a failed audit append
    /// during submission; normal operation never deletes records.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record has this id.
    async fn remove(&self, id: ApplicationId) -> Result<(), StoreError>;

    /// Lists records newest-first, filtered and paginated.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store failure.
    async fn list(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> Result<Page<ApplicationRecord>, StoreError>;

    /// Snapshot of every record, for statistics scans.
    ///
    /// O(n) by design; the aggregate layer documents this as a batch
    /// scan and triggers it off the change feed rather than per request.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store failure.
    async fn all(&self) -> Result<Vec<ApplicationRecord>, StoreError>;
}

/// Append-only compliance ledger.
///
/// Never fails silently: callers must abort their whole operation when
/// an append fails.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Durably appends an entry.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the entry could not be durably persisted.
    async fn append(&self, entry: AuditLogEntry) -> Result<(), StoreError>;

    /// Queries entries newest-first. Read-only; no mutation operations
    /// exist on this store.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store failure.
    async fn query(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> Result<Page<AuditLogEntry>, StoreError>;
}

/// Per-user notification queue.
///
/// Ownership is enforced here: only the recipient may mark a
/// notification read or delete it.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Stores a new notification.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store failure.
    async fn create(&self, notification: Notification) -> Result<(), StoreError>;

    /// Marks a notification read on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `NotOwner` when `requester` is not
    /// the recipient.
    async fn mark_read(
        &self,
        id: NotificationId,
        requester: UserId,
        at: DateTime<Utc>,
    ) -> Result<Notification, StoreError>;

    /// Deletes a notification on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `NotOwner` when `requester` is not
    /// the recipient.
    async fn delete(&self, id: NotificationId, requester: UserId) -> Result<(), StoreError>;

    /// Lists a user's notifications newest-first.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store failure.
    async fn list(
        &self,
        user: UserId,
        unread_only: bool,
        page: &PageRequest,
    ) -> Result<Page<Notification>, StoreError>;
}
