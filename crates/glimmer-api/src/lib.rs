pub mod auth;
pub mod calls;
pub mod error;
pub mod extract;
pub mod gifts;
pub mod hosts;
pub mod packages;
pub mod users;

use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{get, post},
};

use crate::auth::AppState;

/// All routes, bound to `state`. Transport layers (CORS, tracing) are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/user/{id}", get(users::get_user))
        .route("/user/{id}/coins", post(users::adjust_coins))
        .route("/user/{id}/transactions", get(users::get_user_transactions))
        .route("/user/{id}/calls", get(users::get_user_calls))
        .route("/hosts", get(hosts::list_hosts).post(hosts::create_host))
        .route("/host/{id}", get(hosts::get_host))
        .route("/host/{id}/status", post(hosts::update_host_status))
        .route("/host/{id}/calls", get(hosts::get_host_calls))
        .route("/gifts", get(gifts::list_gifts))
        .route("/gifts/{id}", get(gifts::get_gift))
        .route("/coin-packages", get(packages::list_coin_packages))
        .route("/calls", post(calls::create_call));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
