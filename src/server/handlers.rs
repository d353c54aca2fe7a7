// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::cache::StoredResponse;
use crate::error::{Result, WorkerError};
use crate::network::FetchRequest;
use crate::worker::{ClientMessage, Notification, NotificationClick, ResponseSource};
use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Header naming where a worker-handled response came from.
pub const SOURCE_HEADER: &str = "x-sw-source";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
    pub state: Option<String>,
    pub waiting_version: Option<String>,
    pub partitions: BTreeMap<String, usize>,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let active = state.registration.active().await;
    let waiting = state.registration.waiting().await;

    let mut partitions = BTreeMap::new();
    if let Some(worker) = &active {
        for (name, count) in worker.partition_sizes().await {
            partitions.insert(name, count);
        }
    }

    Json(HealthResponse {
        status: if active.is_some() { "ok" } else { "no_active_worker" }.to_string(),
        version: active.as_ref().map(|w| w.version().to_string()),
        state: active.as_ref().map(|w| w.state().as_str().to_string()),
        waiting_version: waiting.as_ref().map(|w| w.version().to_string()),
        partitions,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub activated: bool,
}

/// Page -> worker control message (`{"type": "SKIP_WAITING"}`)
pub async fn message_handler(
    State(state): State<AppState>,
    Json(message): Json<ClientMessage>,
) -> Result<Json<MessageResponse>> {
    let activated = state.registration.post_message(&message).await?;
    Ok(Json(MessageResponse { activated }))
}

/// Push message delivery; the body is the raw push payload
pub async fn push_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Notification>)> {
    let worker = state.registration.active().await.ok_or(WorkerError::NoActiveWorker)?;
    let notification = worker.on_push(&body).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub tag: String,
    pub swept: bool,
}

pub async fn sync_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<SyncResponse>> {
    let worker = state.registration.active().await.ok_or(WorkerError::NoActiveWorker)?;
    let swept = worker.on_sync(&tag).await?;
    Ok(Json(SyncResponse { tag, swept }))
}

pub async fn notifications_handler(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.platform.notifications())
}

#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    pub action: Option<String>,
}

/// Click a shown notification; redirects to the focused/opened window URL
pub async fn click_notification_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ClickQuery>,
) -> Result<Response> {
    let worker = state.registration.active().await.ok_or(WorkerError::NoActiveWorker)?;
    let notification = state
        .platform
        .notification(id)
        .ok_or_else(|| WorkerError::NotificationNotFound(id.to_string()))?;

    let click = NotificationClick {
        notification,
        action: query.action,
    };

    match worker.on_notification_click(click).await? {
        Some(client) => Ok(Redirect::to(&client.url).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub version: String,
    pub state: String,
}

/// Register a new worker version; it waits until SKIP_WAITING unless
/// nothing is active yet
pub async fn update_handler(
    State(state): State<AppState>,
    Json(update): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>> {
    if update.version.trim().is_empty() {
        return Err(WorkerError::InvalidRequest("version must not be empty".into()));
    }

    info!("Registering worker version {}", update.version);
    let worker = state.build_worker(&update.version);
    let worker_state = state.registration.register(worker).await?;

    Ok(Json(UpdateResponse {
        version: update.version,
        state: worker_state.as_str().to_string(),
    }))
}

/// Every non-control request is a fetch event
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.config.server.body_limit_bytes)
        .await
        .map_err(|e| WorkerError::InvalidRequest(format!("Failed to read body: {}", e)))?;
    let fetch_request = FetchRequest::from_parts(parts.method, &parts.uri, parts.headers, body);

    if let Some(worker) = state.registration.active().await {
        if let Some(outcome) = worker.on_fetch(&fetch_request).await {
            // A pending revalidation keeps running after its handle is dropped
            return Ok(to_response(outcome.response, Some(outcome.source)));
        }
    } else {
        debug!("No active worker, passing {} through", fetch_request.url);
    }

    match state.network.fetch(&fetch_request).await {
        Ok(response) => Ok(to_response(response, None)),
        Err(e) => {
            warn!("Passthrough {} {} failed: {}", fetch_request.method, fetch_request.url, e);
            Err(WorkerError::Upstream(e.to_string()))
        }
    }
}

fn to_response(stored: StoredResponse, source: Option<ResponseSource>) -> Response {
    let mut response = Response::new(Body::from(stored.body));
    *response.status_mut() = stored.status;
    *response.headers_mut() = stored.headers;
    if let Some(source) = source {
        response
            .headers_mut()
            .insert(SOURCE_HEADER, HeaderValue::from_static(source.as_str()));
    }
    response
}
