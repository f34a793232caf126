//! # Janseva Testing
//!
//! Testing utilities and helpers for the Janseva service portal.
//!
//! This crate provides:
//! - Deterministic clock implementations of the `Clock` trait
//! - Fixture builders for applicant and document data
//! - Failing store doubles for exercising compensation paths
//!
//! ## Example
//!
//! ```
//! use janseva_testing::mocks::FixedClock;
//! use janseva_core::environment::Clock;
//! use chrono::Utc;
//!
//! let clock = FixedClock::new(Utc::now());
//! assert_eq!(clock.now(), clock.now());
//! ```

/// Mock implementations for testing.
pub mod mocks {
    use chrono::{DateTime, Duration, Utc};
    use janseva_core::environment::Clock;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use janseva_testing::mocks::FixedClock;
    /// use janseva_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every call.
    ///
    /// Useful where a test needs distinct, ordered timestamps (history
    /// entries, processing-time calculations) without sleeping.
    #[derive(Debug)]
    pub struct SteppingClock {
        current: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Create a clock starting at `start`, advancing by `step` per call.
        #[must_use]
        pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                current: Mutex::new(start),
                step,
            }
        }

        /// Convenience constructor stepping one whole day per call.
        #[must_use]
        pub fn daily(start: DateTime<Utc>) -> Self {
            Self::new(start, Duration::days(1))
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            #[allow(clippy::unwrap_used)] // Mutex poisoning only happens if a test already panicked
            let mut current = self.current.lock().unwrap();
            let now = *current;
            *current = now + self.step;
            now
        }
    }
}

/// Fixture builders for domain data.
pub mod fixtures {
    use janseva_core::types::{Address, ApplicantDetails, DocumentUpload};

    /// A valid applicant with an Indian mobile number and PIN code.
    #[must_use]
    pub fn applicant_details() -> ApplicantDetails {
        ApplicantDetails {
            full_name: "Asha Verma".to_string(),
            phone: "+919876543210".to_string(),
            email: Some("asha.verma@example.in".to_string()),
            address: Address {
                line1: "14 MG Road".to_string(),
                line2: Some("Shivaji Nagar".to_string()),
                district: "Pune".to_string(),
                state: "Maharashtra".to_string(),
                pin_code: "411005".to_string(),
            },
        }
    }

    /// A plausible document upload for attaching to submissions.
    #[must_use]
    pub fn document_upload(name: &str) -> DocumentUpload {
        DocumentUpload {
            name: name.to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 24_576,
            url: format!("https://docs.example.in/uploads/{name}"),
            storage_path: format!("uploads/{name}"),
        }
    }
}

/// Store doubles that fail on demand, for exercising compensation and
/// best-effort paths.
pub mod failing {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use janseva_core::store::{
        AuditFilter, AuditLogStore, NotificationStore, Page, PageRequest, StoreError,
    };
    use janseva_core::types::{AuditLogEntry, Notification, NotificationId, UserId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Audit log whose appends always fail.
    ///
    /// Counts append attempts so a test can assert the operation was
    /// actually tried before it was compensated.
    #[derive(Debug, Default)]
    pub struct FailingAuditLog {
        attempts: AtomicUsize,
    }

    impl FailingAuditLog {
        /// How many appends have been attempted.
        #[must_use]
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AuditLogStore for FailingAuditLog {
        async fn append(&self, _entry: AuditLogEntry) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("audit ledger offline".to_string()))
        }

        async fn query(
            &self,
            _filter: &AuditFilter,
            _page: &PageRequest,
        ) -> Result<Page<AuditLogEntry>, StoreError> {
            Err(StoreError::Unavailable("audit ledger offline".to_string()))
        }
    }

    /// Notification store whose writes always fail.
    #[derive(Debug, Default)]
    pub struct FailingNotificationStore {
        attempts: AtomicUsize,
    }

    impl FailingNotificationStore {
        /// How many creates have been attempted.
        #[must_use]
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationStore for FailingNotificationStore {
        async fn create(&self, _notification: Notification) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("notification store offline".to_string()))
        }

        async fn mark_read(
            &self,
            _id: NotificationId,
            _requester: UserId,
            _at: DateTime<Utc>,
        ) -> Result<Notification, StoreError> {
            Err(StoreError::Unavailable("notification store offline".to_string()))
        }

        async fn delete(&self, _id: NotificationId, _requester: UserId) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("notification store offline".to_string()))
        }

        async fn list(
            &self,
            _user: UserId,
            _unread_only: bool,
            _page: &PageRequest,
        ) -> Result<Page<Notification>, StoreError> {
            Err(StoreError::Unavailable("notification store offline".to_string()))
        }
    }
}
