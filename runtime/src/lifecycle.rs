//! The lifecycle controller.
//!
//! [`LifecycleService`] is the single entry point for every operation
//! that touches an application record. It validates authorization and
//! state legality, mutates the record store, appends to the audit log,
//! and creates notifications - one logical unit of work per request.
//!
//! ## Unit-of-work ordering
//!
//! 1. Policy and ownership checks (denials are themselves audited).
//! 2. Transition-legality check against the status table.
//! 3. Record write through the store's optimistic-concurrency gate; a
//!    lost race surfaces as `Conflict` and is never retried here.
//! 4. Audit append. Failure aborts the operation: the record write is
//!    compensated (restored to its prior state) so no partial effect is
//!    visible, and the caller sees `Dependency`.
//! 5. Notification create, best-effort: failure is logged at WARN and
//!    never propagated. A notification failure must not roll back the
//!    status change that triggered it.

use janseva_core::catalog::ServiceCatalog;
use janseva_core::environment::Clock;
use janseva_core::error::LifecycleError;
use janseva_core::policy::{self, LifecycleAction};
use janseva_core::status::ApplicationStatus;
use janseva_core::store::{
    ApplicationFilter, ApplicationStore, AuditFilter, AuditLogStore, NotificationStore, Page,
    PageRequest, StoreError,
};
use janseva_core::types::{
    ApplicantDetails, ApplicationId, ApplicationRecord, AuditAction, AuditLogEntry, DocumentRef,
    DocumentUpload, Money, Notification, NotificationId, NotificationKind, ResourceType, Role,
    StatusHistoryEntry, UserId,
};
use janseva_core::validate::validate_applicant_details;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

/// Verified caller identity and request metadata.
///
/// Identity verification happens upstream; the controller trusts the
/// `actor` and `role` it is handed and only decides authorization.
#[derive(Clone, Copy, Debug)]
pub struct RequestContext {
    /// The authenticated user.
    pub actor: UserId,
    /// The user's role claim.
    pub role: Role,
    /// Client IP for audit entries, when known.
    pub ip: Option<IpAddr>,
}

impl RequestContext {
    /// Context without an IP (tests, internal calls).
    #[must_use]
    pub const fn new(actor: UserId, role: Role) -> Self {
        Self {
            actor,
            role,
            ip: None,
        }
    }
}

/// Caller input for a new application.
#[derive(Clone, Debug)]
pub struct NewApplication {
    /// Service being applied for.
    pub service_id: janseva_core::ServiceId,
    /// Applicant snapshot to capture.
    pub applicant_details: ApplicantDetails,
    /// Free-form service-specific fields.
    pub additional_info: serde_json::Value,
    /// Document references already uploaded to document storage.
    pub documents: Vec<DocumentUpload>,
}

/// Status projection of one application: current status plus the full
/// history.
#[derive(Clone, Debug, Serialize)]
pub struct StatusView {
    /// Current status.
    pub status: ApplicationStatus,
    /// Full append-only history, oldest first.
    pub status_history: Vec<StatusHistoryEntry>,
    /// Time of the most recent mutation.
    pub last_updated: DateTime<Utc>,
}

/// The orchestrating component of the lifecycle core.
pub struct LifecycleService {
    applications: Arc<dyn ApplicationStore>,
    audit: Arc<dyn AuditLogStore>,
    notifications: Arc<dyn NotificationStore>,
    catalog: Arc<ServiceCatalog>,
    clock: Arc<dyn Clock>,
}

impl LifecycleService {
    /// Wires the controller to its stores.
    #[must_use]
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        audit: Arc<dyn AuditLogStore>,
        notifications: Arc<dyn NotificationStore>,
        catalog: Arc<ServiceCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            applications,
            audit,
            notifications,
            catalog,
            clock,
        }
    }

    /// The service catalog this controller validates submissions against.
    #[must_use]
    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Accepts a citizen's service request.
    ///
    /// Allocates the identifier and all timestamps server-side, writes
    /// the record with a single-entry history, audits the submission and
    /// notifies the applicant.
    ///
    /// # Errors
    ///
    /// `NotFound` if the service is missing or inactive, `Validation` on
    /// schema violations, `Dependency` if the record or audit store is
    /// unavailable.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        new: NewApplication,
    ) -> Result<ApplicationRecord, LifecycleError> {
        let service = self.catalog.require_active(new.service_id)?.clone();
        validate_applicant_details(&new.applicant_details)?;

        let now = self.clock.now();
        let id = ApplicationId::new();
        let documents: Vec<DocumentRef> = new
            .documents
            .into_iter()
            .map(|upload| DocumentRef::from_upload(upload, ctx.actor, now))
            .collect();

        let record = ApplicationRecord {
            id,
            service_id: service.id,
            applicant: ctx.actor,
            applicant_details: new.applicant_details,
            additional_info: new.additional_info,
            documents,
            status: ApplicationStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: ApplicationStatus::Pending,
                changed_at: now,
                remarks: None,
                actor: Some(ctx.actor),
            }],
            fee_amount: service.fee,
            created_at: now,
            updated_at: now,
        };

        self.applications
            .insert(record.clone())
            .await
            .map_err(|e| LifecycleError::dependency(format!("application store: {e}")))?;

        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            action: AuditAction::ApplicationSubmitted,
            actor: Some(ctx.actor),
            resource_id: id.to_string(),
            resource_type: ResourceType::Application,
            details: json!({
                "service_id": service.id,
                "service_name": service.name,
            }),
            ip_address: ctx.ip,
            recorded_at: now,
        };
        if let Err(audit_err) = self.audit.append(entry).await {
            // The ledger is non-negotiable: undo the submission so no
            // unaudited record is visible.
            if let Err(undo_err) = self.applications.remove(id).await {
                tracing::error!(
                    application_id = %id,
                    error = %undo_err,
                    "failed to compensate submission after audit failure"
                );
            }
            return Err(LifecycleError::dependency(format!(
                "audit log: {audit_err}"
            )));
        }

        self.notify_best_effort(
            ctx.actor,
            "Application received".to_string(),
            format!(
                "Your application for {} has been received and is pending review.",
                service.name
            ),
            NotificationKind::Info,
            Some(id),
        )
        .await;

        tracing::info!(
            application_id = %id,
            applicant = %ctx.actor,
            service = %service.name,
            "application submitted"
        );
        Ok(record)
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    /// Moves an application along the status graph.
    ///
    /// The read-check-write cycle commits through the store's version
    /// gate, so two racing calls on the same record cannot both succeed
    /// from the same source status.
    ///
    /// `fee_paid` is recorded on the record when the transition enters
    /// `completed`; it is ignored for other targets.
    ///
    /// # Errors
    ///
    /// `Forbidden` for unauthorized roles or the applicant acting on
    /// their own record (both audited), `NotFound` for unknown ids,
    /// `IllegalTransition` when the target is not reachable, `Conflict`
    /// on a lost race, `Dependency` on store failure.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
        new_status: ApplicationStatus,
        remarks: Option<String>,
        fee_paid: Option<Money>,
    ) -> Result<ApplicationRecord, LifecycleError> {
        if !policy::role_may(LifecycleAction::UpdateStatus, ctx.role) {
            self.audit_denial(ctx, "update_status", Some(id)).await;
            return Err(LifecycleError::forbidden(format!(
                "role {} may not update application status",
                ctx.role
            )));
        }

        let (version, previous) = self.get_record(id).await?;

        if previous.applicant == ctx.actor {
            self.audit_denial(ctx, "update_status_own_application", Some(id))
                .await;
            return Err(LifecycleError::forbidden(
                "applicants may not act on their own application",
            ));
        }

        if !previous.status.can_transition_to(new_status) {
            return Err(LifecycleError::IllegalTransition {
                from: previous.status,
                to: new_status,
            });
        }

        let now = self.clock.now();
        let mut updated = previous.clone();
        updated.status = new_status;
        updated.status_history.push(StatusHistoryEntry {
            status: new_status,
            changed_at: now,
            remarks: remarks.clone(),
            actor: Some(ctx.actor),
        });
        updated.updated_at = now;
        if new_status == ApplicationStatus::Completed {
            if let Some(fee) = fee_paid {
                updated.fee_amount = Some(fee);
            }
        }

        let new_version = match self
            .applications
            .update(id, version, updated.clone())
            .await
        {
            Ok(v) => v,
            Err(StoreError::VersionConflict { expected, actual }) => {
                return Err(LifecycleError::Conflict {
                    message: format!(
                        "application {id} was modified concurrently (expected version {expected}, found {actual})"
                    ),
                });
            }
            Err(StoreError::NotFound(_)) => {
                return Err(LifecycleError::not_found("application", id));
            }
            Err(e) => {
                return Err(LifecycleError::dependency(format!(
                    "application store: {e}"
                )));
            }
        };

        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            action: AuditAction::ApplicationStatusUpdated,
            actor: Some(ctx.actor),
            resource_id: id.to_string(),
            resource_type: ResourceType::Application,
            details: json!({
                "from": previous.status,
                "to": new_status,
                "remarks": remarks,
            }),
            ip_address: ctx.ip,
            recorded_at: now,
        };
        if let Err(audit_err) = self.audit.append(entry).await {
            // Compensate: put the prior state back so readers never see
            // an unaudited transition.
            if let Err(undo_err) = self
                .applications
                .update(id, new_version, previous.clone())
                .await
            {
                tracing::error!(
                    application_id = %id,
                    error = %undo_err,
                    "failed to compensate status change after audit failure"
                );
            }
            return Err(LifecycleError::dependency(format!(
                "audit log: {audit_err}"
            )));
        }

        let (title, message) = status_notification_text(new_status, id);
        self.notify_best_effort(
            updated.applicant,
            title,
            message,
            NotificationKind::StatusUpdate,
            Some(id),
        )
        .await;

        tracing::info!(
            application_id = %id,
            from = %previous.status,
            to = %new_status,
            actor = %ctx.actor,
            "application status updated"
        );
        Ok(updated)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetches one application, enforcing owner-or-elevated access.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Forbidden` (audited) when the
    /// requester neither owns the record nor holds an elevated role.
    pub async fn get_application(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
    ) -> Result<ApplicationRecord, LifecycleError> {
        let (_, record) = self.get_record(id).await?;
        if record.applicant != ctx.actor
            && !policy::role_may(LifecycleAction::ViewApplication, ctx.role)
        {
            self.audit_denial(ctx, "view_application", Some(id)).await;
            return Err(LifecycleError::forbidden(
                "not the applicant of this application",
            ));
        }
        Ok(record)
    }

    /// Fetches one application's status and full history.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_application`].
    pub async fn get_status(
        &self,
        ctx: &RequestContext,
        id: ApplicationId,
    ) -> Result<StatusView, LifecycleError> {
        let record = self.get_application(ctx, id).await?;
        Ok(StatusView {
            status: record.status,
            status_history: record.status_history,
            last_updated: record.updated_at,
        })
    }

    /// Lists applications newest-first.
    ///
    /// Citizens are forcibly scoped to their own records regardless of
    /// the filter they pass; elevated roles may query across applicants.
    ///
    /// # Errors
    ///
    /// `Dependency` on store failure.
    pub async fn list_applications(
        &self,
        ctx: &RequestContext,
        mut filter: ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<ApplicationRecord>, LifecycleError> {
        if !policy::role_may(LifecycleAction::ListAllApplications, ctx.role) {
            filter.applicant = Some(ctx.actor);
        }
        self.applications
            .list(&filter, &page)
            .await
            .map_err(|e| LifecycleError::dependency(format!("application store: {e}")))
    }

    /// Queries the audit log. Admin only.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-admin roles, `Dependency` on store failure.
    pub async fn audit_trail(
        &self,
        ctx: &RequestContext,
        filter: AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditLogEntry>, LifecycleError> {
        if !policy::role_may(LifecycleAction::QueryAuditLog, ctx.role) {
            self.audit_denial(ctx, "query_audit_log", None).await;
            return Err(LifecycleError::forbidden(format!(
                "role {} may not query the audit log",
                ctx.role
            )));
        }
        self.audit
            .query(&filter, &page)
            .await
            .map_err(|e| LifecycleError::dependency(format!("audit log: {e}")))
    }

    // ========================================================================
    // Notification self-service
    // ========================================================================

    /// Lists the caller's notifications newest-first.
    ///
    /// # Errors
    ///
    /// `Dependency` on store failure.
    pub async fn list_notifications(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>, LifecycleError> {
        self.notifications
            .list(ctx.actor, unread_only, &page)
            .await
            .map_err(|e| LifecycleError::dependency(format!("notification store: {e}")))
    }

    /// Marks one of the caller's notifications read.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Forbidden` when the caller is not
    /// the recipient.
    pub async fn mark_notification_read(
        &self,
        ctx: &RequestContext,
        id: NotificationId,
    ) -> Result<Notification, LifecycleError> {
        self.notifications
            .mark_read(id, ctx.actor, self.clock.now())
            .await
            .map_err(|e| map_notification_error(e, id))
    }

    /// Deletes one of the caller's notifications.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `Forbidden` when the caller is not
    /// the recipient.
    pub async fn delete_notification(
        &self,
        ctx: &RequestContext,
        id: NotificationId,
    ) -> Result<(), LifecycleError> {
        self.notifications
            .delete(id, ctx.actor)
            .await
            .map_err(|e| map_notification_error(e, id))
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    async fn get_record(
        &self,
        id: ApplicationId,
    ) -> Result<(janseva_core::store::Version, ApplicationRecord), LifecycleError> {
        match self.applications.get(id).await {
            Ok(found) => Ok(found),
            Err(StoreError::NotFound(_)) => Err(LifecycleError::not_found("application", id)),
            Err(e) => Err(LifecycleError::dependency(format!(
                "application store: {e}"
            ))),
        }
    }

    /// Records a security-relevant denial. Best-effort: the request is
    /// already failing, so an audit outage here is logged rather than
    /// turned into a different error.
    async fn audit_denial(
        &self,
        ctx: &RequestContext,
        attempted: &str,
        application: Option<ApplicationId>,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            action: AuditAction::AuthorizationDenied,
            actor: Some(ctx.actor),
            resource_id: application.map_or_else(String::new, |id| id.to_string()),
            resource_type: ResourceType::Application,
            details: json!({
                "attempted_action": attempted,
                "role": ctx.role,
            }),
            ip_address: ctx.ip,
            recorded_at: self.clock.now(),
        };
        if let Err(e) = self.audit.append(entry).await {
            tracing::warn!(
                actor = %ctx.actor,
                attempted_action = attempted,
                error = %e,
                "failed to audit authorization denial"
            );
        }
    }

    async fn notify_best_effort(
        &self,
        user: UserId,
        title: String,
        message: String,
        kind: NotificationKind,
        related_id: Option<ApplicationId>,
    ) {
        let now = self.clock.now();
        let notification = Notification {
            id: NotificationId::new(),
            user_id: user,
            title,
            message,
            kind,
            related_id,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = self.notifications.create(notification).await {
            tracing::warn!(
                user = %user,
                related_id = ?related_id,
                error = %e,
                "failed to create notification; continuing without it"
            );
        }
    }
}

fn map_notification_error(err: StoreError, id: NotificationId) -> LifecycleError {
    match err {
        StoreError::NotFound(_) => LifecycleError::not_found("notification", id),
        StoreError::NotOwner(_) => {
            LifecycleError::forbidden("not the recipient of this notification")
        }
        other => LifecycleError::dependency(format!("notification store: {other}")),
    }
}

fn status_notification_text(status: ApplicationStatus, id: ApplicationId) -> (String, String) {
    match status {
        ApplicationStatus::Pending => (
            "Application received".to_string(),
            format!("Application {id} has been received."),
        ),
        ApplicationStatus::UnderReview => (
            "Application under review".to_string(),
            format!("Application {id} is now being reviewed."),
        ),
        ApplicationStatus::Approved => (
            "Application approved".to_string(),
            format!("Application {id} has been approved."),
        ),
        ApplicationStatus::Rejected => (
            "Application rejected".to_string(),
            format!("Application {id} has been rejected. See remarks for details."),
        ),
        ApplicationStatus::Completed => (
            "Application completed".to_string(),
            format!("Application {id} has been completed."),
        ),
    }
}
