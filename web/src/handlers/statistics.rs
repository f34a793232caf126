//! Statistics endpoints: pull snapshots and the live WebSocket feed.
//!
//! # Live feed protocol
//!
//! The socket is server-push only. On connect the client immediately
//! receives the current snapshot, then a fresh snapshot after every
//! relevant application change:
//!
//! ```json
//! {
//!   "scope": "system",
//!   "total_services": 6,
//!   "applications_processed": 12,
//!   "average_processing_days": 4.5
//! }
//! ```
//!
//! Text frames from the client are ignored; a close frame ends the
//! subscription.

use crate::error::AppError;
use crate::extractors::Identity;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
    Json,
};
use futures::{stream::StreamExt, SinkExt};
use janseva_core::stats::{SystemStatistics, UserStatistics};
use janseva_runtime::{StatisticsScope, StatisticsSnapshot};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// `GET /api/statistics`
///
/// System-wide aggregates. Any authenticated caller; the snapshot
/// contains no per-user data.
pub async fn system(
    State(state): State<AppState>,
    _identity: Identity,
) -> Result<Json<SystemStatistics>, AppError> {
    Ok(Json(state.statistics.system_snapshot().await?))
}

/// `GET /api/statistics/me`
///
/// The caller's own aggregates.
pub async fn me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<UserStatistics>, AppError> {
    Ok(Json(state.statistics.user_snapshot(identity.actor).await?))
}

/// Query parameters of `GET /api/statistics/live`.
#[derive(Debug, Default, Deserialize)]
pub struct LiveQuery {
    /// `"system"` (default) or `"me"` for the caller's own aggregates.
    pub scope: Option<String>,
}

/// `GET /api/statistics/live`
///
/// Upgrades to a WebSocket streaming statistics snapshots.
pub async fn live(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<LiveQuery>,
) -> Result<Response, AppError> {
    let scope = match query.scope.as_deref() {
        None | Some("system") => StatisticsScope::System,
        Some("me") => StatisticsScope::User(identity.actor),
        Some(other) => {
            return Err(AppError::bad_request(format!(
                "unknown statistics scope: {other}"
            )));
        }
    };

    info!(?scope, "statistics WebSocket connection requested");
    Ok(ws.on_upgrade(move |socket| stream_snapshots(socket, state, scope)))
}

/// Drives one live-statistics socket.
///
/// Spawns two concurrent tasks:
/// 1. **Sender**: forwards fresh snapshots to the client
/// 2. **Receiver**: drains client frames, watching for close
async fn stream_snapshots(socket: WebSocket, state: AppState, scope: StatisticsScope) {
    info!(?scope, "statistics WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();

    // Bridge the aggregator's callback interface onto a channel the
    // send task can await.
    let (tx, mut rx) = mpsc::unbounded_channel::<StatisticsSnapshot>();
    let subscription = state.statistics.subscribe(
        scope,
        Box::new(move |snapshot| {
            let _ = tx.send(snapshot);
        }),
    );

    let mut send_task = tokio::spawn(async move {
        // The subscription lives exactly as long as this task; dropping
        // the handle cancels it.
        let _subscription = subscription;
        while let Some(snapshot) = rx.recv().await {
            let message = match serde_json::to_string(&snapshot) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    warn!(error = %e, "failed to serialize statistics snapshot");
                    continue;
                }
            };
            if sender.send(message).await.is_err() {
                // Client disconnected
                break;
            }
        }
        debug!("statistics send task terminated");
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => {
                    info!("client requested close");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Axum answers pings automatically
                }
                Message::Text(_) | Message::Binary(_) => {
                    debug!("ignoring client frame on server-push socket");
                }
            }
        }
        debug!("statistics receive task terminated");
    });

    // Either side finishing means the connection is done.
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        },
        _ = (&mut recv_task) => {
            send_task.abort();
        },
    }

    info!(?scope, "statistics WebSocket connection closed");
}
