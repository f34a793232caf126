//! Router assembly.

use crate::handlers::{applications, audit, health, notifications, statistics};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Builds the full application router.
///
/// Everything under `/api` expects the gateway identity headers;
/// `/health` and `GET /api/statistics` are open.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            post(applications::submit).get(applications::list),
        )
        .route("/applications/:id", get(applications::get))
        .route(
            "/applications/:id/status",
            get(applications::get_status).put(applications::update_status),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route("/notifications/:id", delete(notifications::delete))
        .route("/statistics", get(statistics::system))
        .route("/statistics/me", get(statistics::me))
        .route("/statistics/live", get(statistics::live))
        .route("/audit", get(audit::query))
}
