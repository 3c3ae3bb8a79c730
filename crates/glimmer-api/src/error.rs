use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use glimmer_db::StoreError;
use glimmer_types::api::ErrorBody;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

/// Handler failures. Every variant renders as `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request input.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown id; carries the entity name ("User", "Host", ...).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store failure. Only `context` reaches the client.
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    /// The blocking store task panicked or was cancelled.
    #[error("{context}")]
    Task {
        context: &'static str,
        #[source]
        source: JoinError,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Store errors the client caused become 400s; the rest are hidden
    /// behind `context`.
    pub fn from_store(context: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::BalanceOverflow(_) => ApiError::bad_request("Amount out of range"),
            source => ApiError::Internal { context, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } | ApiError::Task { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { context, source } => error!("{}: {}", context, source),
            ApiError::Task { context, source } => {
                error!("{}: spawn_blocking join error: {}", context, source)
            }
            _ => {}
        }

        let body = ErrorBody {
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Attaches a route's generic failure message to store errors.
pub trait StoreResultExt<T> {
    fn or_internal(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for glimmer_db::Result<T> {
    fn or_internal(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|source| ApiError::from_store(context, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_hides_store_detail() {
        let err = ApiError::Internal {
            context: "Failed to get user",
            source: StoreError::LockPoisoned("users".into()),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to get user");
    }

    #[test]
    fn balance_overflow_is_a_client_error() {
        let err = ApiError::from_store("Failed to update coins", StoreError::BalanceOverflow(1));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Amount out of range");
    }

    #[test]
    fn not_found_names_entity() {
        let err = ApiError::NotFound("Host");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Host not found");
    }
}
