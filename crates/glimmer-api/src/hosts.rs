use axum::{
    Json,
    extract::{Query, State},
};
use tracing::info;

use glimmer_types::api::{HostQuery, HostStatusRequest};
use glimmer_types::models::{Call, Host, NewHost};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};

/// GET /api/hosts — `?online=true|false` filters, anything else lists all.
pub async fn list_hosts(
    State(state): State<AppState>,
    Query(query): Query<HostQuery>,
) -> Result<Json<Vec<Host>>, ApiError> {
    let online = query.online_filter();
    let hosts = state
        .with_store("Failed to get hosts", move |store| store.get_hosts(online))
        .await?;
    Ok(Json(hosts))
}

pub async fn get_host(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Host>, ApiError> {
    let host = state
        .with_store("Failed to get host", move |store| store.get_host(id))
        .await?
        .ok_or(ApiError::NotFound("Host"))?;
    Ok(Json(host))
}

pub async fn create_host(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewHost>,
) -> Result<Json<Host>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Host name is required"));
    }

    let host = state
        .with_store("Failed to create host", move |store| store.create_host(req))
        .await?;
    info!(host_id = host.id, "Created host {}", host.name);
    Ok(Json(host))
}

pub async fn update_host_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<HostStatusRequest>,
) -> Result<Json<Host>, ApiError> {
    let is_online = req
        .is_online
        .ok_or_else(|| ApiError::bad_request("isOnline is required"))?;

    let host = state
        .with_store("Failed to update host status", move |store| {
            store.update_host_status(id, is_online)
        })
        .await?
        .ok_or(ApiError::NotFound("Host"))?;
    Ok(Json(host))
}

pub async fn get_host_calls(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Call>>, ApiError> {
    let calls = state
        .with_store("Failed to get calls", move |store| store.get_host_calls(id))
        .await?;
    Ok(Json(calls))
}
