//! Audit log query endpoint. Admin only.

use crate::error::AppError;
use crate::extractors::{ClientIp, Identity};
use crate::pagination::{parse_page, PageResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use janseva_core::store::AuditFilter;
use janseva_core::types::{AuditAction, AuditLogEntry, UserId};
use serde::Deserialize;

/// Query parameters of `GET /api/audit`.
#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    /// Restrict to one action.
    pub action: Option<AuditAction>,
    /// Restrict to one actor.
    pub actor: Option<UserId>,
    /// Restrict to entries about one resource.
    pub resource_id: Option<String>,
    /// Page size, clamped server-side.
    pub limit: Option<usize>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// `GET /api/audit`
///
/// Queries the audit log newest-first. Non-admin callers get 403 and
/// the attempt itself is recorded.
pub async fn query(
    State(state): State<AppState>,
    identity: Identity,
    ClientIp(ip): ClientIp,
    Query(query): Query<AuditQuery>,
) -> Result<Json<PageResponse<AuditLogEntry>>, AppError> {
    let ctx = identity.context(ip);
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let filter = AuditFilter {
        action: query.action,
        actor: query.actor,
        resource_id: query.resource_id,
    };
    let entries = state.lifecycle.audit_trail(&ctx, filter, page).await?;
    Ok(Json(entries.into()))
}
