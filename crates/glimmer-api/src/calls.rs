use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::warn;

use glimmer_types::models::{Call, NewCall};

use crate::auth::AppState;
use crate::error::ApiError;

/// Every body problem, from bad JSON to an unknown status, is reported the
/// same way.
pub async fn create_call(
    State(state): State<AppState>,
    payload: Result<Json<NewCall>, JsonRejection>,
) -> Result<Json<Call>, ApiError> {
    let Json(call) = payload.map_err(|e| {
        warn!("Rejected call payload: {}", e.body_text());
        ApiError::bad_request("Invalid call data")
    })?;

    let call = state
        .with_store("Failed to create call", move |store| store.create_call(call))
        .await?;
    Ok(Json(call))
}
