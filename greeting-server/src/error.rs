//! Error types for the greeting server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use greeting_core::RegistryError;

/// Errors that can occur when building a router.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No credential validator or identity provider was configured.
    #[error("No credential validator configured. Call .validator(), .validator_factory() or .identity_provider() before .build()")]
    NoValidator,

    /// The tool registry could not be assembled.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Request-level errors that never reach the authorization gate or the
/// RPC dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No route matches the method and path.
    #[error("Not found")]
    NotFound,

    /// Body exceeds the configured limit.
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// `POST /mcp` body is not declared as JSON.
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
