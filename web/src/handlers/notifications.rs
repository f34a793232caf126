//! Notification self-service endpoints.
//!
//! Always scoped to the authenticated caller; there is no way to read
//! or mutate another user's notifications through this surface.

use crate::error::AppError;
use crate::extractors::Identity;
use crate::pagination::{parse_page, PageResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use janseva_core::types::{Notification, NotificationId};
use janseva_runtime::RequestContext;
use serde::Deserialize;

fn context(identity: Identity) -> RequestContext {
    RequestContext::new(identity.actor, identity.role)
}

/// Query parameters of `GET /api/notifications`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Page size, clamped server-side.
    pub limit: Option<usize>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// `GET /api/notifications`
///
/// Lists the caller's notifications newest-first.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListQuery>,
) -> Result<Json<PageResponse<Notification>>, AppError> {
    let page = parse_page(query.limit, query.cursor.as_deref())?;
    let notifications = state
        .lifecycle
        .list_notifications(&context(identity), query.unread_only, page)
        .await?;
    Ok(Json(notifications.into()))
}

/// `PUT /api/notifications/:id/read`
///
/// Marks one of the caller's notifications read. Idempotent.
pub async fn mark_read(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification = state
        .lifecycle
        .mark_notification_read(&context(identity), id)
        .await?;
    Ok(Json(notification))
}

/// `DELETE /api/notifications/:id`
///
/// Deletes one of the caller's notifications. Responds 204.
pub async fn delete(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, AppError> {
    state
        .lifecycle
        .delete_notification(&context(identity), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
