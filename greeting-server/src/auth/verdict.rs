//! Gate outcome types.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Result of evaluating one request at the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(Denial),
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Why a request was refused. Never carries validator internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    #[error("missing bearer token")]
    MissingToken,

    #[error("expected audience is not configured")]
    MisconfiguredAudience,

    #[error("token validation failed")]
    ValidationFailed,
}

/// A refusal, ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub reason: DenyReason,
    /// `WWW-Authenticate` value; present on 401 only.
    pub challenge: Option<HeaderValue>,
}

impl Denial {
    pub fn unauthorized(reason: DenyReason, challenge: HeaderValue) -> Self {
        Self {
            reason,
            challenge: Some(challenge),
        }
    }

    pub fn misconfigured() -> Self {
        Self {
            reason: DenyReason::MisconfiguredAudience,
            challenge: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.reason {
            DenyReason::MissingToken | DenyReason::ValidationFailed => StatusCode::UNAUTHORIZED,
            DenyReason::MisconfiguredAudience => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = status.into_response();
        let headers = response.headers_mut();
        match self.challenge {
            Some(challenge) => {
                headers.insert(header::WWW_AUTHENTICATE, challenge);
            }
            None => {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            }
        }
        response
    }
}
