use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use glimmer_db::{Repository, StoreError, default_username};
use glimmer_types::api::{LoginRequest, LoginResponse};
use glimmer_types::models::{NewUser, User};

use crate::error::{ApiError, StoreResultExt};
use crate::extract::ApiJson;

/// Coins granted to an account the first time its phone logs in.
pub const WELCOME_BONUS: i64 = 100;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn Repository>,
}

impl AppStateInner {
    pub fn new(store: Arc<dyn Repository>) -> AppState {
        Arc::new(Self { store })
    }

    /// Runs `f` against the store off the async runtime. Store errors and
    /// join errors both surface as `context`.
    pub async fn with_store<F, T>(&self, context: &'static str, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn Repository) -> glimmer_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|source| ApiError::Task { context, source })?
            .or_internal(context)
    }
}

/// Find-or-create by phone number. There is no code verification: knowing
/// the phone is enough.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let phone = req
        .phone
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Phone number is required"))?;

    let user = state
        .with_store("Login failed", move |store| find_or_create(store, phone))
        .await?;

    Ok(Json(LoginResponse { user }))
}

fn find_or_create(store: &dyn Repository, phone: String) -> glimmer_db::Result<User> {
    if let Some(user) = store.get_user_by_phone(&phone)? {
        return Ok(user);
    }

    let new_user = NewUser {
        username: Some(default_username(&phone)),
        phone,
        coin_balance: Some(WELCOME_BONUS),
        ..Default::default()
    };

    match store.create_user(new_user) {
        Ok(user) => {
            info!(user_id = user.id, "Created user with welcome bonus");
            Ok(user)
        }
        // Lost a race with a concurrent login for the same phone.
        Err(StoreError::DuplicatePhone(phone)) => store
            .get_user_by_phone(&phone)?
            .ok_or(StoreError::DuplicatePhone(phone)),
        Err(e) => Err(e),
    }
}
