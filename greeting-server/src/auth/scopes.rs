//! Which scopes a request needs, read from its JSON-RPC body.

use axum::http::{HeaderMap, Method};
use greeting_core::ToolRegistry;
use serde_json::Value;

use crate::transport::is_json;

/// Scopes a request must carry beyond a valid token.
///
/// Only a `POST` with a JSON content type whose body is a `tools/call` for a
/// registered operation yields scopes. Everything else, including bodies
/// that fail to parse, yields `None` and falls back to plain validation.
pub fn resolve_required_scopes(
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
    registry: &ToolRegistry,
) -> Option<Vec<String>> {
    if method != Method::POST || !is_json(headers) {
        return None;
    }

    let message: Value = serde_json::from_slice(body).ok()?;
    if message.get("method").and_then(Value::as_str) != Some("tools/call") {
        return None;
    }

    let name = message
        .get("params")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)?;

    match registry.required_scopes(name) {
        Some(scopes) => Some(scopes.to_vec()),
        None => {
            tracing::debug!(tool = %name, "tools/call names an unregistered tool; no scopes required");
            None
        }
    }
}
