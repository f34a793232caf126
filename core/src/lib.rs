//! # Janseva Core
//!
//! Domain model and invariants for the citizen application lifecycle.
//!
//! This crate is the functional core of the portal backend: owned data
//! types, the status state machine, the authorization policy table, input
//! validation, and the trait seams behind which storage lives. It performs
//! no I/O of its own.
//!
//! ## Layout
//!
//! - [`types`]: identifiers, money, records, notifications, audit entries
//! - [`status`]: the application status machine and its transition table
//! - [`policy`]: the closed `(action, role)` authorization table
//! - [`validate`]: applicant detail validation (contact, phone, PIN code)
//! - [`catalog`]: read-only service catalog reference data
//! - [`store`]: async storage traits with optimistic concurrency
//! - [`stats`]: pure statistics functions over the record set
//!
//! ## Design principles
//!
//! - All identifiers and timestamps that affect invariants are assigned by
//!   the server, never accepted from the caller.
//! - Status history is append-only; its last entry always matches the
//!   record's current status.
//! - Roles form a closed set checked against an explicit policy table at
//!   the controller boundary, not ad hoc string comparisons in handlers.

pub mod catalog;
pub mod error;
pub mod policy;
pub mod stats;
pub mod status;
pub mod store;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use error::LifecycleError;
pub use status::ApplicationStatus;
pub use types::{
    ApplicationId, ApplicationRecord, AuditAction, AuditLogEntry, DocumentId, DocumentRef, Money,
    Notification, NotificationId, NotificationKind, Role, ServiceId, StatusHistoryEntry, UserId,
};

/// Environment traits - injected dependencies for the lifecycle runtime.
///
/// External dependencies (currently only time) are abstracted behind
/// traits so the controller stays deterministic under test.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability.
    pub trait Clock: Send + Sync {
        /// Get the current time.
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
