//! Stateless HTTP bridge to the JSON-RPC dispatcher.
//!
//! Each body is dispatched on its own; no session is created or looked up.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use greeting_core::rpc::{codes, Dispatch, McpHandler};

use crate::error::{ServerError, ServerResult};

/// Default request body limit (1 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RpcTransport {
    handler: Arc<McpHandler>,
}

impl RpcTransport {
    pub fn new(handler: McpHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Dispatch one buffered body and render the HTTP response.
    ///
    /// Bodies not declared as JSON get `415` and are never dispatched, since
    /// scope resolution only reads JSON bodies. Notifications get `202` with
    /// no body. Parse and envelope errors get `400`; every other JSON-RPC
    /// outcome, errors included, is a `200`.
    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Response {
        if !is_json(headers) {
            return ServerError::UnsupportedMediaType.into_response();
        }

        match self.handler.handle_bytes(body).await {
            Dispatch::Accepted => StatusCode::ACCEPTED.into_response(),
            Dispatch::Response(response) => {
                let status = match response.error.as_ref().map(|e| e.code) {
                    Some(codes::PARSE_ERROR | codes::INVALID_REQUEST) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::OK,
                };
                (status, Json(response)).into_response()
            }
        }
    }
}

/// Whether the request declares a JSON body.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Buffer a request body, refusing anything over `limit` bytes.
pub async fn read_body(body: Body, headers: &HeaderMap, limit: usize) -> ServerResult<Bytes> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit as u64) {
        return Err(ServerError::PayloadTooLarge(limit));
    }

    // Undeclared bodies are cut off at the limit while streaming.
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| ServerError::PayloadTooLarge(limit))
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
