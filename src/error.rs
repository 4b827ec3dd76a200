use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of the access guard and the token service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header at all. The caller must retry with credentials.
    #[error("unauthorized access")]
    MissingToken,

    /// A token was supplied but its signature, structure or expiry is invalid.
    #[error("Forbidden access")]
    Unauthenticated,

    /// The verified identity does not own the requested resource.
    #[error("forbidden access")]
    Forbidden,

    /// The server could not sign a new token.
    #[error("could not sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::Unauthenticated | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Signing(ref e) => {
                tracing::error!(error = %e, "token signing failed");
                return failure_body(StatusCode::INTERNAL_SERVER_ERROR, &self.to_string());
            }
        };
        tracing::warn!(status = status.as_u16(), reason = %self, "request rejected");
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// A document operation against the backing store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Startup configuration problems. Returned from `AppConfig::load`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(e) => e.into_response(),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store operation failed");
                failure_body(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
            }
        }
    }
}

/// The generic `{success:false, error}` body used for server-side failures.
fn failure_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}
