use axum::{Json, extract::State};

use glimmer_types::api::AdjustCoinsRequest;
use glimmer_types::models::{Call, Transaction, TransactionKind, User};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .with_store("Failed to get user", move |store| store.get_user(id))
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// Applies a signed coin amount to the balance and logs a transaction in
/// the same store operation. Balances are not floored, so debits can drive
/// them negative; a sum outside `i64` is a 400.
pub async fn adjust_coins(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AdjustCoinsRequest>,
) -> Result<Json<User>, ApiError> {
    let amount = req
        .amount
        .ok_or_else(|| ApiError::bad_request("Amount is required"))?;
    let kind = req.transaction_type.unwrap_or(TransactionKind::Purchase);

    let user = state
        .with_store("Failed to update coins", move |store| {
            store.adjust_coins(id, amount, kind)
        })
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

pub async fn get_user_transactions(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state
        .with_store("Failed to get transactions", move |store| {
            store.get_user_transactions(id)
        })
        .await?;
    Ok(Json(transactions))
}

pub async fn get_user_calls(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<Call>>, ApiError> {
    let calls = state
        .with_store("Failed to get calls", move |store| store.get_user_calls(id))
        .await?;
    Ok(Json(calls))
}
