//! Authorization policy for lifecycle operations.
//!
//! A closed table keyed by `(action, role)`, checked once at the
//! controller boundary. Handlers never compare role strings themselves.

use crate::types::Role;

/// The actions the lifecycle controller authorizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    /// Submit a new application.
    Submit,
    /// Transition an application's status.
    UpdateStatus,
    /// Read a single application.
    ViewApplication,
    /// List applications across applicants.
    ListAllApplications,
    /// Query the audit log.
    QueryAuditLog,
}

/// Whether `role` may perform `action` at all.
///
/// Ownership checks (an applicant viewing their own record) are applied
/// separately by the controller; this table covers the role dimension
/// only.
#[must_use]
pub const fn role_may(action: LifecycleAction, role: Role) -> bool {
    match action {
        LifecycleAction::Submit => true,
        LifecycleAction::UpdateStatus | LifecycleAction::ListAllApplications => {
            matches!(role, Role::Staff | Role::Officer | Role::Admin)
        }
        // Owners are allowed through separately; the table answers for
        // cross-applicant access.
        LifecycleAction::ViewApplication => matches!(role, Role::Staff | Role::Officer | Role::Admin),
        LifecycleAction::QueryAuditLog => matches!(role, Role::Admin),
    }
}
