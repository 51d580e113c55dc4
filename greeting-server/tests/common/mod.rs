//! Shared helpers for the greeting-server integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use greeting_server::{
    standard_registry, CredentialValidator, GreetingRouter, HostingProfile, ValidationError,
    ValidationOptions,
};
use serde_json::Value;
use tower::ServiceExt;

pub const AUDIENCE: &str = "https://greet.example.com";

/// Validator backed by a fixed token table: token → granted scopes.
///
/// Enforces audience and required scopes the way a real provider would.
pub struct StaticTokens {
    tokens: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl StaticTokens {
    pub fn new(entries: &[(&str, &[&str])]) -> Arc<Self> {
        Arc::new(Self {
            tokens: entries
                .iter()
                .map(|(token, scopes)| {
                    (
                        token.to_string(),
                        scopes.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    /// `reader` holds `usr:read`; `todo-reader` and `todo-writer` hold the
    /// todo scopes; `bare` holds nothing.
    pub fn standard() -> Arc<Self> {
        Self::new(&[
            ("reader", &["usr:read"]),
            ("todo-reader", &["todo:read"]),
            ("todo-writer", &["todo:read", "todo:write"]),
            ("bare", &[]),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialValidator for StaticTokens {
    async fn validate(
        &self,
        token: &str,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let granted = self.tokens.get(token).ok_or(ValidationError::Malformed)?;
        if !options.audience.iter().any(|a| a == AUDIENCE) {
            return Err(ValidationError::AudienceMismatch);
        }
        if let Some(required) = &options.required_scopes {
            if !required.iter().all(|s| granted.contains(s)) {
                return Err(ValidationError::InsufficientScope);
            }
        }
        Ok(())
    }
}

/// Validator that always fails with the given error.
pub struct Failing(pub ValidationError);

#[async_trait]
impl CredentialValidator for Failing {
    async fn validate(&self, _: &str, _: &ValidationOptions) -> Result<(), ValidationError> {
        Err(self.0.clone())
    }
}

pub const PROFILES: [HostingProfile; 2] = [HostingProfile::Edge, HostingProfile::Process];

pub fn app(
    profile: HostingProfile,
    validator: Arc<dyn CredentialValidator>,
    with_todos: bool,
) -> Router {
    GreetingRouter::new(standard_registry(with_todos).unwrap())
        .audience(AUDIENCE)
        .validator(validator)
        .profile(profile)
        .build()
        .unwrap()
}

pub fn rpc_request(token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("host", "greet.example.com")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments },
    })
    .to_string()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
