//! Domain types for the citizen application lifecycle.
//!
//! Value objects and entities shared by every component: identifiers,
//! money, the application record with its append-only status history,
//! notifications and audit log entries.

use crate::status::ApplicationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an application record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    /// Creates a new random `ApplicationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ApplicationId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApplicationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identity of a portal user (citizen or staff), as verified upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a service catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(Uuid);

impl ServiceId {
    /// Creates a new random `ServiceId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ServiceId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random `NotificationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `NotificationId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Server-assigned identifier for an attached document reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new random `DocumentId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `DocumentId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ============================================================================
// Money
// ============================================================================

/// Monetary amount in paise (minor currency units).
///
/// Stored as integer minor units to keep fee arithmetic exact; whole-rupee
/// reporting rounds to the nearest rupee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` from paise.
    #[must_use]
    pub const fn from_paise(paise: u64) -> Self {
        Self(paise)
    }

    /// Creates a `Money` from whole rupees.
    #[must_use]
    pub const fn from_rupees(rupees: u64) -> Self {
        Self(rupees * 100)
    }

    /// Amount in paise.
    #[must_use]
    pub const fn paise(&self) -> u64 {
        self.0
    }

    /// Amount rounded to the nearest whole rupee.
    #[must_use]
    pub const fn rupees(&self) -> u64 {
        (self.0 + 50) / 100
    }

    /// Checked addition, `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Caller role, as attached by the upstream authentication gate.
///
/// A closed set: unknown role strings are rejected at the HTTP boundary
/// rather than silently treated as citizens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary citizen; may submit and view their own applications.
    Citizen,
    /// Front-desk staff; may review applications.
    Staff,
    /// Approving officer; may review applications.
    Officer,
    /// Administrator; full read access plus compliance queries.
    Admin,
}

impl Role {
    /// Whether this role may act on applications owned by other users.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Staff | Self::Officer | Self::Admin)
    }

    /// Wire representation used in headers and audit details.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Staff => "staff",
            Self::Officer => "officer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Self::Citizen),
            "staff" => Ok(Self::Staff),
            "officer" => Ok(Self::Officer),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized role string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

// ============================================================================
// Applicant details
// ============================================================================

/// Postal address of the applicant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// First address line (house / street).
    pub line1: String,
    /// Optional second address line.
    #[serde(default)]
    pub line2: Option<String>,
    /// District name.
    pub district: String,
    /// State name.
    pub state: String,
    /// Six-digit postal PIN code.
    pub pin_code: String,
}

/// Snapshot of the applicant's details captured at submission time.
///
/// A copy, not a live reference: later profile edits never retroactively
/// alter a pending application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    /// Full legal name.
    pub full_name: String,
    /// Ten-digit mobile number, optionally prefixed with `+91`.
    pub phone: String,
    /// Optional contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Postal address.
    pub address: Address,
}

// ============================================================================
// Documents
// ============================================================================

/// Document metadata supplied by the caller at submission.
///
/// The binary itself lives in external document storage; the lifecycle
/// core only carries the reference it is handed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    /// Original file name.
    pub name: String,
    /// MIME content type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Download URL issued by document storage.
    pub url: String,
    /// Storage path within the document store.
    pub storage_path: String,
}

/// An attached document reference owned by an application record.
///
/// Keyed by a server-assigned [`DocumentId`]; the document list is an
/// ordered, append-only sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Server-assigned identifier.
    pub id: DocumentId,
    /// Original file name.
    pub name: String,
    /// MIME content type.
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Download URL issued by document storage.
    pub url: String,
    /// Storage path within the document store.
    pub storage_path: String,
    /// User who uploaded the document.
    pub uploaded_by: UserId,
    /// Server-assigned upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl DocumentRef {
    /// Builds a reference from caller-supplied metadata, assigning the
    /// identifier and timestamp server-side.
    #[must_use]
    pub fn from_upload(upload: DocumentUpload, uploaded_by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            name: upload.name,
            content_type: upload.content_type,
            size_bytes: upload.size_bytes,
            url: upload.url,
            storage_path: upload.storage_path,
            uploaded_by,
            uploaded_at: at,
        }
    }
}

// ============================================================================
// Status history
// ============================================================================

/// One entry in an application's append-only status history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// Status the record entered.
    pub status: ApplicationStatus,
    /// Server-assigned time of the transition.
    pub changed_at: DateTime<Utc>,
    /// Optional remarks recorded by the acting user.
    #[serde(default)]
    pub remarks: Option<String>,
    /// User who caused the transition, `None` for system actions.
    #[serde(default)]
    pub actor: Option<UserId>,
}

// ============================================================================
// Application record
// ============================================================================

/// The persisted representation of one citizen's service request.
///
/// Created exactly once at submission; afterwards only `status` evolves
/// (per the transition table), `documents` and `status_history` append,
/// and `updated_at` moves forward. Never deleted by normal operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Opaque unique identifier, assigned at submission.
    pub id: ApplicationId,
    /// Service catalog entry this application is for.
    pub service_id: ServiceId,
    /// Identity of the submitting citizen.
    pub applicant: UserId,
    /// Snapshot of applicant details captured at submission.
    pub applicant_details: ApplicantDetails,
    /// Free-form service-specific field map.
    #[serde(default)]
    pub additional_info: serde_json::Value,
    /// Ordered, append-only list of attached document references.
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    /// Current lifecycle status.
    pub status: ApplicationStatus,
    /// Append-only history; the last entry always matches `status`.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Fee paid for the service, recorded on completion (or from the
    /// catalog at submission); contributes to aggregates only once the
    /// record is completed.
    #[serde(default)]
    pub fee_amount: Option<Money>,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Moves forward on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Time the application was submitted, from the first history entry.
    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.status_history.first().map(|e| e.changed_at)
    }

    /// Time the application reached [`ApplicationStatus::Completed`], if
    /// it has.
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.status_history
            .iter()
            .find(|e| e.status == ApplicationStatus::Completed)
            .map(|e| e.changed_at)
    }

    /// Whether the history invariant holds: non-empty, and the last entry
    /// matches the current status.
    #[must_use]
    pub fn history_is_consistent(&self) -> bool {
        self.status_history
            .last()
            .is_some_and(|last| last.status == self.status)
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Category of a notification record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// General informational message.
    Info,
    /// A status change on one of the user's applications.
    StatusUpdate,
    /// Something the user must act on.
    ActionRequired,
}

/// A per-user notification record.
///
/// Owned by the recipient: only that user may mark it read or delete it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier.
    pub id: NotificationId,
    /// Recipient user.
    pub user_id: UserId,
    /// Short title.
    pub title: String,
    /// Message body.
    pub message: String,
    /// Category.
    pub kind: NotificationKind,
    /// Related application, when the notification was triggered by one.
    #[serde(default)]
    pub related_id: Option<ApplicationId>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Moves forward when the read flag changes.
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Audit log
// ============================================================================

/// State-changing actions recorded in the compliance ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A new application was submitted.
    ApplicationSubmitted,
    /// An application's status was changed.
    ApplicationStatusUpdated,
    /// An authenticated caller attempted an action they were not
    /// authorized for.
    AuthorizationDenied,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ApplicationSubmitted => "APPLICATION_SUBMITTED",
            Self::ApplicationStatusUpdated => "APPLICATION_STATUS_UPDATED",
            Self::AuthorizationDenied => "AUTHORIZATION_DENIED",
        };
        f.write_str(name)
    }
}

/// Type of the resource an audit entry refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// An application record.
    Application,
    /// A notification record.
    Notification,
}

/// One write-once entry in the audit log.
///
/// Queried but never updated or deleted by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// The action recorded.
    pub action: AuditAction,
    /// Acting user, `None` for system actions.
    #[serde(default)]
    pub actor: Option<UserId>,
    /// Identifier of the affected resource.
    pub resource_id: String,
    /// Type of the affected resource.
    pub resource_type: ResourceType,
    /// Structured action-specific details (before/after status, etc.).
    pub details: serde_json::Value,
    /// Client IP the request arrived from, when known.
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
    /// Server-assigned time the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_to_nearest_rupee() {
        assert_eq!(Money::from_paise(4_950).rupees(), 50);
        assert_eq!(Money::from_paise(5_049).rupees(), 50);
        assert_eq!(Money::from_paise(5_050).rupees(), 51);
        assert_eq!(Money::from_rupees(50).paise(), 5_000);
    }

    #[test]
    fn role_round_trips_through_wire_name() {
        for role in [Role::Citizen, Role::Staff, Role::Officer, Role::Admin] {
            assert_eq!(role.wire_name().parse::<Role>().unwrap(), role);
        }
        assert!("clerk".parse::<Role>().is_err());
    }

    #[test]
    fn elevated_roles() {
        assert!(!Role::Citizen.is_elevated());
        assert!(Role::Staff.is_elevated());
        assert!(Role::Officer.is_elevated());
        assert!(Role::Admin.is_elevated());
    }

    #[test]
    fn document_ref_assigns_server_side_fields() {
        let user = UserId::new();
        let at = Utc::now();
        let upload = DocumentUpload {
            name: "aadhaar.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 52_133,
            url: "https://docs.example/aadhaar.pdf".to_string(),
            storage_path: "uploads/aadhaar.pdf".to_string(),
        };
        let doc = DocumentRef::from_upload(upload, user, at);
        assert_eq!(doc.uploaded_by, user);
        assert_eq!(doc.uploaded_at, at);
        assert_eq!(doc.name, "aadhaar.pdf");
    }
}
