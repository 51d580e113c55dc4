//! Edge adapter: one `fetch` entry point that routes by hand.

use axum::extract::Request;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{GateRequest, Verdict, MCP_PATH, METADATA_PATH};
use crate::cors;
use crate::error::ServerError;
use crate::state::AppState;
use crate::transport::read_body;

/// Fetch-style request handler.
#[derive(Debug, Clone)]
pub struct EdgeWorker {
    state: AppState,
}

impl EdgeWorker {
    pub(crate) fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Handle one request end to end.
    pub async fn fetch(&self, request: Request) -> Response {
        let mut response = self.route(request).await;
        cors::decorate(response.headers_mut());
        response
    }

    async fn route(&self, request: Request) -> Response {
        let path = request.uri().path();

        if request.method() == Method::OPTIONS {
            return cors::preflight_response();
        }
        if request.method() == Method::GET && path == METADATA_PATH {
            return Json(self.state.metadata.as_ref().clone()).into_response();
        }
        if request.method() == Method::POST && path == MCP_PATH {
            return self.rpc(request).await;
        }

        ServerError::NotFound.into_response()
    }

    async fn rpc(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let body = match read_body(body, &parts.headers, self.state.body_limit).await {
            Ok(body) => body,
            Err(e) => return e.into_response(),
        };

        let verdict = self
            .state
            .gate
            .evaluate(GateRequest {
                method: &parts.method,
                uri: &parts.uri,
                headers: &parts.headers,
                body: &body,
            })
            .await;

        match verdict {
            Verdict::Allow => self.state.transport.handle(&parts.headers, &body).await,
            Verdict::Deny(denial) => denial.into_response(),
        }
    }
}

/// Expose an [`EdgeWorker`] as an axum router so it can be served locally.
pub(crate) fn router(state: AppState) -> Router {
    let worker = EdgeWorker::new(state);
    Router::new()
        .fallback(move |request: Request| {
            let worker = worker.clone();
            async move { worker.fetch(request).await }
        })
        .layer(TraceLayer::new_for_http())
}
