//! The authorization gate: turns an inbound request into a [`Verdict`].

use std::time::Duration;

use axum::http::{header, HeaderMap, Method, Uri};
use greeting_core::ToolRegistry;

use super::challenge::{challenge_value, request_origin, WELL_KNOWN_SEGMENT};
use super::scopes::resolve_required_scopes;
use super::validator::{LazyValidator, ValidationError, ValidationOptions};
use super::verdict::{Denial, DenyReason, Verdict};

/// Default upper bound on one validation call.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

const BEARER_PREFIX: &str = "Bearer ";

/// The parts of a request the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
    /// Buffered body; read only to resolve required scopes.
    pub body: &'a [u8],
}

/// Bearer-token gate shared by every hosting adapter.
///
/// Evaluation never fails: every outcome, including validator construction
/// failure and timeouts, is expressed as a [`Verdict`].
#[derive(Debug, Clone)]
pub struct AuthGate {
    audience: String,
    registry: ToolRegistry,
    validator: LazyValidator,
    timeout: Duration,
}

impl AuthGate {
    pub fn new(audience: impl Into<String>, registry: ToolRegistry, validator: LazyValidator) -> Self {
        Self {
            audience: audience.into(),
            registry,
            validator,
            timeout: DEFAULT_VALIDATION_TIMEOUT,
        }
    }

    /// Bound each validation call; an elapsed call denies with 401.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Decide whether `request` may proceed.
    pub async fn evaluate(&self, request: GateRequest<'_>) -> Verdict {
        if request.uri.path().contains(WELL_KNOWN_SEGMENT) {
            return Verdict::Allow;
        }

        let unauthorized = |reason| {
            let origin = request_origin(request.uri, request.headers);
            Verdict::Deny(Denial::unauthorized(reason, challenge_value(&origin)))
        };

        let Some(token) = bearer_token(request.headers) else {
            tracing::info!(event = "auth_denied", reason = "missing_token");
            return unauthorized(DenyReason::MissingToken);
        };

        if self.audience.is_empty() {
            tracing::error!(event = "auth_denied", reason = "audience_not_configured");
            return Verdict::Deny(Denial::misconfigured());
        }

        let required_scopes = resolve_required_scopes(
            request.method,
            request.headers,
            request.body,
            &self.registry,
        );
        let options = ValidationOptions::for_audience(self.audience.clone())
            .with_required_scopes(required_scopes);

        match self.validate(token, &options).await {
            Ok(()) => Verdict::Allow,
            Err(error) => {
                tracing::info!(event = "auth_denied", reason = error.category());
                unauthorized(DenyReason::ValidationFailed)
            }
        }
    }

    async fn validate(&self, token: &str, options: &ValidationOptions) -> Result<(), ValidationError> {
        let validator = self.validator.get().await?;
        tokio::time::timeout(self.timeout, validator.validate(token, options))
            .await
            .map_err(|_| ValidationError::Timeout)?
    }
}

/// Token following the case-sensitive `Bearer ` prefix, trimmed.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
