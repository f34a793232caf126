//! Application submission, retrieval and status transition endpoints.

use crate::error::AppError;
use crate::extractors::{ClientIp, Identity};
use crate::pagination::{parse_page, PageResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use janseva_core::store::ApplicationFilter;
use janseva_core::types::{
    ApplicantDetails, ApplicationId, ApplicationRecord, DocumentUpload, Money, ServiceId, UserId,
};
use janseva_core::ApplicationStatus;
use chrono::{DateTime, Utc};
use janseva_runtime::{NewApplication, StatusView};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/applications`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Service being applied for.
    pub service_id: ServiceId,
    /// Applicant snapshot to capture on the record.
    pub applicant_details: ApplicantDetails,
    /// Free-form service-specific fields.
    #[serde(default)]
    pub additional_info: serde_json::Value,
    /// Documents already uploaded to document storage.
    #[serde(default)]
    pub documents: Vec<DocumentUpload>,
}

/// Body of the 201 response to a submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier.
    pub application_id: ApplicationId,
    /// Always `pending` on a fresh submission.
    pub status: ApplicationStatus,
    /// Server-assigned submission time.
    pub created_at: DateTime<Utc>,
}

/// `POST /api/applications`
///
/// Submits a new application on behalf of the caller. Responds 201 with
/// the server-assigned id; the full record is available at
/// `GET /api/applications/:id`.
pub async fn submit(
    State(state): State<AppState>,
    identity: Identity,
    ClientIp(ip): ClientIp,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let ctx = identity.context(ip);
    let record = state
        .lifecycle
        .submit(
            &ctx,
            NewApplication {
                service_id: request.service_id,
                applicant_details: request.applicant_details,
                additional_info: request.additional_info,
                documents: request.documents,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            application_id: record.id,
            status: record.status,
            created_at: record.created_at,
        }),
    ))
}

/// Query parameters of `GET /api/applications`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict to one status.
    pub status: Option<ApplicationStatus>,
    /// Restrict to one applicant (elevated roles only; citizens are
    /// always scoped to themselves).
    pub applicant: Option<UserId>,
    /// Page size, clamped server-side.
    pub limit: Option<usize>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// `GET /api/applications`
///
/// Lists applications newest-first. Citizens see only their own.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    ClientIp(ip): ClientIp,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<ApplicationRecord>>, AppError> {
    let ctx = identity.context(ip);
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let filter = ApplicationFilter {
        applicant: query.applicant,
        status: query.status,
    };
    let records = state.lifecycle.list_applications(&ctx, filter, page).await?;
    Ok(Json(records.into()))
}

/// `GET /api/applications/:id`
///
/// Fetches one application. Owner or elevated role only.
pub async fn get(
    State(state): State<AppState>,
    identity: Identity,
    ClientIp(ip): ClientIp,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let ctx = identity.context(ip);
    let record = state.lifecycle.get_application(&ctx, id).await?;
    Ok(Json(record))
}

/// `GET /api/applications/:id/status`
///
/// Fetches one application's current status and full history.
pub async fn get_status(
    State(state): State<AppState>,
    identity: Identity,
    ClientIp(ip): ClientIp,
    Path(id): Path<ApplicationId>,
) -> Result<Json<StatusView>, AppError> {
    let ctx = identity.context(ip);
    let view = state.lifecycle.get_status(&ctx, id).await?;
    Ok(Json(view))
}

/// Body of `PUT /api/applications/:id/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status.
    pub status: ApplicationStatus,
    /// Free-text remarks recorded on the history entry.
    pub remarks: Option<String>,
    /// Fee actually collected, in paise. Only meaningful when the
    /// transition enters `completed`.
    pub fee_paid: Option<Money>,
}

/// `PUT /api/applications/:id/status`
///
/// Moves an application along the status graph. Elevated roles only;
/// illegal transitions and lost races respond 409.
pub async fn update_status(
    State(state): State<AppState>,
    identity: Identity,
    ClientIp(ip): ClientIp,
    Path(id): Path<ApplicationId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let ctx = identity.context(ip);
    let record = state
        .lifecycle
        .update_status(&ctx, id, request.status, request.remarks, request.fee_paid)
        .await?;
    Ok(Json(record))
}
