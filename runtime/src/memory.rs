//! In-memory store implementations.
//!
//! These back the single-process deployment and every test. Each store
//! is a `tokio::sync::RwLock` over a plain map or vector; the
//! application store holds a [`Version`] beside each record and refuses
//! stale writes, which is all the per-record serialization the
//! controller needs - the read-check-write cycle either commits against
//! the version it read or observes a conflict.
//!
//! The document store proper (an external document database in
//! production) is out of scope for the lifecycle core; these
//! implementations are its stand-in behind the same traits.

use crate::feed::{ApplicationChange, ChangeFeed};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use janseva_core::store::{
    ApplicationFilter, ApplicationStore, AuditFilter, AuditLogStore, NotificationStore, Page,
    PageCursor, PageRequest, StoreError, Version,
};
use janseva_core::types::{
    ApplicationId, ApplicationRecord, AuditLogEntry, Notification, NotificationId, UserId,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sorts newest-first with an id tie-break, applies the cursor, and cuts
/// one page.
fn paginate<T>(
    mut items: Vec<T>,
    key: impl Fn(&T) -> (DateTime<Utc>, Uuid),
    page: &PageRequest,
) -> Page<T> {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    if let Some(cursor) = page.cursor {
        items.retain(|item| key(item) < (cursor.created_at, cursor.id));
    }
    let has_more = items.len() > page.limit;
    items.truncate(page.limit);
    let next_cursor = if has_more {
        items.last().map(|item| {
            let (created_at, id) = key(item);
            PageCursor { created_at, id }
        })
    } else {
        None
    };
    Page { items, next_cursor }
}

// ============================================================================
// Application store
// ============================================================================

/// In-memory [`ApplicationStore`] with optimistic concurrency.
///
/// Publishes an [`ApplicationChange`] on the shared [`ChangeFeed`] after
/// every committed mutation.
#[derive(Debug)]
pub struct InMemoryApplicationStore {
    records: RwLock<HashMap<ApplicationId, (Version, ApplicationRecord)>>,
    feed: ChangeFeed,
}

impl InMemoryApplicationStore {
    /// Creates an empty store publishing to `feed`.
    #[must_use]
    pub fn new(feed: ChangeFeed) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            feed,
        }
    }

    /// The change feed this store publishes to.
    #[must_use]
    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

impl Default for InMemoryApplicationStore {
    fn default() -> Self {
        Self::new(ChangeFeed::default())
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, record: ApplicationRecord) -> Result<Version, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate application id {}",
                record.id
            )));
        }
        let change = ApplicationChange {
            id: record.id,
            applicant: record.applicant,
            status: record.status,
        };
        records.insert(record.id, (Version::INITIAL, record));
        drop(records);
        self.feed.publish(change);
        Ok(Version::INITIAL)
    }

    async fn get(
        &self,
        id: ApplicationId,
    ) -> Result<(Version, ApplicationRecord), StoreError> {
        self.records
            .read()
            .await
            .get(&id)
            .map(|(version, record)| (*version, record.clone()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(
        &self,
        id: ApplicationId,
        expected: Version,
        record: ApplicationRecord,
    ) -> Result<Version, StoreError> {
        let mut records = self.records.write().await;
        let slot = records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if slot.0 != expected {
            return Err(StoreError::VersionConflict {
                expected,
                actual: slot.0,
            });
        }
        let next = expected.next();
        let change = ApplicationChange {
            id,
            applicant: record.applicant,
            status: record.status,
        };
        *slot = (next, record);
        drop(records);
        self.feed.publish(change);
        Ok(next)
    }

    async fn remove(&self, id: ApplicationId) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let (_, record) = records
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        drop(records);
        // Removal only happens as compensation; the publish keeps
        // aggregate subscribers in step with the restored truth.
        self.feed.publish(ApplicationChange {
            id,
            applicant: record.applicant,
            status: record.status,
        });
        Ok(())
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> Result<Page<ApplicationRecord>, StoreError> {
        let records = self.records.read().await;
        let matching: Vec<ApplicationRecord> = records
            .values()
            .map(|(_, record)| record)
            .filter(|record| filter.applicant.is_none_or(|a| record.applicant == a))
            .filter(|record| filter.status.is_none_or(|s| record.status == s))
            .cloned()
            .collect();
        drop(records);
        Ok(paginate(
            matching,
            |record| (record.created_at, *record.id.as_uuid()),
            page,
        ))
    }

    async fn all(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .map(|(_, record)| record.clone())
            .collect())
    }
}

// ============================================================================
// Audit log
// ============================================================================

/// In-memory append-only [`AuditLogStore`].
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries appended so far.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no entries have been appended.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditLogStore for InMemoryAuditLog {
    async fn append(&self, entry: AuditLogEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn query(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> Result<Page<AuditLogEntry>, StoreError> {
        let entries = self.entries.read().await;
        let matching: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|entry| filter.action.is_none_or(|a| entry.action == a))
            .filter(|entry| filter.actor.is_none_or(|a| entry.actor == Some(a)))
            .filter(|entry| {
                filter
                    .resource_id
                    .as_ref()
                    .is_none_or(|r| &entry.resource_id == r)
            })
            .cloned()
            .collect();
        drop(entries);
        Ok(paginate(
            matching,
            |entry| (entry.recorded_at, entry.id),
            page,
        ))
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// In-memory [`NotificationStore`] with ownership enforcement.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationStore {
    /// Creates an empty notification store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, notification: Notification) -> Result<(), StoreError> {
        self.notifications
            .write()
            .await
            .insert(notification.id, notification);
        Ok(())
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        requester: UserId,
        at: DateTime<Utc>,
    ) -> Result<Notification, StoreError> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if notification.user_id != requester {
            return Err(StoreError::NotOwner(id.to_string()));
        }
        if !notification.is_read {
            notification.is_read = true;
            notification.updated_at = at;
        }
        Ok(notification.clone())
    }

    async fn delete(&self, id: NotificationId, requester: UserId) -> Result<(), StoreError> {
        let mut notifications = self.notifications.write().await;
        match notifications.get(&id) {
            None => Err(StoreError::NotFound(id.to_string())),
            Some(notification) if notification.user_id != requester => {
                Err(StoreError::NotOwner(id.to_string()))
            }
            Some(_) => {
                notifications.remove(&id);
                Ok(())
            }
        }
    }

    async fn list(
        &self,
        user: UserId,
        unread_only: bool,
        page: &PageRequest,
    ) -> Result<Page<Notification>, StoreError> {
        let notifications = self.notifications.read().await;
        let matching: Vec<Notification> = notifications
            .values()
            .filter(|n| n.user_id == user)
            .filter(|n| !unread_only || !n.is_read)
            .cloned()
            .collect();
        drop(notifications);
        Ok(paginate(
            matching,
            |n| (n.created_at, *n.id.as_uuid()),
            page,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use janseva_core::types::{Address, ApplicantDetails, NotificationKind, ServiceId};
    use janseva_core::{ApplicationStatus, StatusHistoryEntry};
    use chrono::Duration;

    fn sample_record(applicant: UserId, created_at: DateTime<Utc>) -> ApplicationRecord {
        ApplicationRecord {
            id: ApplicationId::new(),
            service_id: ServiceId::new(),
            applicant,
            applicant_details: ApplicantDetails {
                full_name: "Asha Verma".to_string(),
                phone: "9876543210".to_string(),
                email: None,
                address: Address {
                    line1: "14 MG Road".to_string(),
                    line2: None,
                    district: "Pune".to_string(),
                    state: "Maharashtra".to_string(),
                    pin_code: "411001".to_string(),
                },
            },
            additional_info: serde_json::Value::Null,
            documents: vec![],
            status: ApplicationStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: ApplicationStatus::Pending,
                changed_at: created_at,
                remarks: None,
                actor: Some(applicant),
            }],
            fee_amount: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = InMemoryApplicationStore::default();
        let record = sample_record(UserId::new(), Utc::now());
        let id = record.id;

        let version = store.insert(record.clone()).await.unwrap();
        assert_eq!(version, Version::INITIAL);

        let (loaded_version, loaded) = store.get(id).await.unwrap();
        assert_eq!(loaded_version, Version::INITIAL);
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn stale_version_is_refused() {
        let store = InMemoryApplicationStore::default();
        let record = sample_record(UserId::new(), Utc::now());
        let id = record.id;
        store.insert(record.clone()).await.unwrap();

        // First writer commits
        let v2 = store
            .update(id, Version::INITIAL, record.clone())
            .await
            .unwrap();
        assert_eq!(v2, Version::INITIAL.next());

        // Second writer still holds the old version
        let err = store.update(id, Version::INITIAL, record).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_restartable() {
        let store = InMemoryApplicationStore::default();
        let user = UserId::new();
        let base = Utc::now();
        for i in 0..5 {
            store
                .insert(sample_record(user, base + Duration::seconds(i)))
                .await
                .unwrap();
        }

        let first = store
            .list(
                &ApplicationFilter::default(),
                &PageRequest::first(2),
            )
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.items[0].created_at >= first.items[1].created_at);
        let cursor = first.next_cursor.unwrap();

        let second = store
            .list(
                &ApplicationFilter::default(),
                &PageRequest {
                    limit: 10,
                    cursor: Some(cursor),
                },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 3);
        assert!(second.next_cursor.is_none());

        // No overlap between pages
        for item in &second.items {
            assert!(!first.items.iter().any(|i| i.id == item.id));
        }
    }

    #[tokio::test]
    async fn list_filters_by_status_and_applicant() {
        let store = InMemoryApplicationStore::default();
        let asha = UserId::new();
        let ravi = UserId::new();
        store.insert(sample_record(asha, Utc::now())).await.unwrap();
        store.insert(sample_record(ravi, Utc::now())).await.unwrap();

        let filter = ApplicationFilter {
            applicant: Some(asha),
            status: Some(ApplicationStatus::Pending),
        };
        let page = store.list(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].applicant, asha);
    }

    #[tokio::test]
    async fn notifications_enforce_ownership() {
        let store = InMemoryNotificationStore::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let now = Utc::now();
        let notification = Notification {
            id: NotificationId::new(),
            user_id: owner,
            title: "Application received".to_string(),
            message: "We have received your application".to_string(),
            kind: NotificationKind::Info,
            related_id: None,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        let id = notification.id;
        store.create(notification).await.unwrap();

        let err = store.mark_read(id, stranger, now).await.unwrap_err();
        assert!(matches!(err, StoreError::NotOwner(_)));
        let err = store.delete(id, stranger).await.unwrap_err();
        assert!(matches!(err, StoreError::NotOwner(_)));

        let read = store.mark_read(id, owner, now).await.unwrap();
        assert!(read.is_read);
        store.delete(id, owner).await.unwrap();
        assert!(matches!(
            store.delete(id, owner).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn unread_filter_hides_read_notifications() {
        let store = InMemoryNotificationStore::new();
        let owner = UserId::new();
        let now = Utc::now();
        for i in 0..3 {
            store
                .create(Notification {
                    id: NotificationId::new(),
                    user_id: owner,
                    title: format!("n{i}"),
                    message: String::new(),
                    kind: NotificationKind::Info,
                    related_id: None,
                    is_read: false,
                    created_at: now + Duration::seconds(i),
                    updated_at: now + Duration::seconds(i),
                })
                .await
                .unwrap();
        }

        let all = store
            .list(owner, false, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.items.len(), 3);

        let first = all.items[0].id;
        store.mark_read(first, owner, now).await.unwrap();

        let unread = store
            .list(owner, true, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(unread.items.len(), 2);
        assert!(unread.items.iter().all(|n| n.id != first));
    }
}
