//! Long-running process adapter: axum routes with the gate as middleware.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::metadata;
use crate::auth::{GateRequest, Verdict, MCP_PATH, METADATA_PATH, ROOT_METADATA_PATH};
use crate::cors;
use crate::error::ServerError;
use crate::state::AppState;
use crate::transport::read_body;

/// Build the process router over `state`.
pub(crate) fn router(state: AppState) -> Router {
    let gated = middleware::from_fn_with_state(state.clone(), require_authorization);

    Router::new()
        .route(
            MCP_PATH,
            post(mcp).route_layer(gated).fallback(not_found),
        )
        .route(METADATA_PATH, get(metadata).fallback(not_found))
        .route(ROOT_METADATA_PATH, get(metadata).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(preflight))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(cors::ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static(cors::EXPOSE_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return cors::preflight_response();
    }
    next.run(request).await
}

/// Buffer the body, ask the gate, and either continue or render the denial.
async fn require_authorization(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match read_body(body, &parts.headers, state.body_limit).await {
        Ok(body) => body,
        Err(e) => return e.into_response(),
    };

    let verdict = state
        .gate
        .evaluate(GateRequest {
            method: &parts.method,
            uri: &parts.uri,
            headers: &parts.headers,
            body: &body,
        })
        .await;

    match verdict {
        Verdict::Allow => next.run(Request::from_parts(parts, Body::from(body))).await,
        Verdict::Deny(denial) => denial.into_response(),
    }
}

async fn mcp(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    state.transport.handle(&headers, &body).await
}

async fn not_found() -> ServerError {
    ServerError::NotFound
}
