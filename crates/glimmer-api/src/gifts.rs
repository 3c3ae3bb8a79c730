use axum::{Json, extract::State};

use glimmer_types::models::Gift;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::ApiPath;

pub async fn list_gifts(State(state): State<AppState>) -> Result<Json<Vec<Gift>>, ApiError> {
    let gifts = state
        .with_store("Failed to get gifts", |store| store.get_gifts())
        .await?;
    Ok(Json(gifts))
}

pub async fn get_gift(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Gift>, ApiError> {
    let gift = state
        .with_store("Failed to get gift", move |store| store.get_gift(id))
        .await?
        .ok_or(ApiError::NotFound("Gift"))?;
    Ok(Json(gift))
}
