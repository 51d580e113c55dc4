//! Credential validator seam and its lazily constructed process-wide handle.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

/// Constraints a token must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accepted audiences; the token must name at least one.
    pub audience: Vec<String>,
    /// Scopes the token must carry. `None` checks validity and audience only.
    pub required_scopes: Option<Vec<String>>,
}

impl ValidationOptions {
    pub fn for_audience(audience: impl Into<String>) -> Self {
        Self {
            audience: vec![audience.into()],
            required_scopes: None,
        }
    }

    pub fn with_required_scopes(mut self, scopes: Option<Vec<String>>) -> Self {
        self.required_scopes = scopes;
        self
    }
}

/// Why a token was rejected.
///
/// Messages never include token material. Only [`ValidationError::category`]
/// is ever logged; none of this reaches clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token audience does not match")]
    AudienceMismatch,

    #[error("token issuer does not match")]
    IssuerMismatch,

    #[error("token lacks a required scope")]
    InsufficientScope,

    #[error("no signing key matches the token")]
    KeyUnavailable,

    #[error("identity provider could not be reached")]
    Unavailable,

    #[error("token validation timed out")]
    Timeout,

    /// The validator itself could not be constructed.
    #[error("identity provider is not configured: {0}")]
    Misconfigured(String),
}

impl ValidationError {
    /// Static label safe to attach to log records.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Expired => "expired",
            Self::InvalidSignature => "signature",
            Self::AudienceMismatch => "audience",
            Self::IssuerMismatch => "issuer",
            Self::InsufficientScope => "scope",
            Self::KeyUnavailable => "key_unavailable",
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::Misconfigured(_) => "misconfigured",
        }
    }
}

/// Validates bearer tokens on behalf of the authorization gate.
///
/// Implementations own signature checking, expiry, audience and scope
/// enforcement. The gate only cares whether the call succeeded.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, token: &str, options: &ValidationOptions)
        -> Result<(), ValidationError>;
}

type ValidatorFactory =
    dyn Fn() -> Result<Arc<dyn CredentialValidator>, ValidationError> + Send + Sync;

/// Process-wide validator handle, constructed at most once on first use.
///
/// Concurrent first requests race on a single-flight cell; only one factory
/// call wins. A failed construction is not remembered, so a later request
/// retries.
#[derive(Clone)]
pub struct LazyValidator {
    cell: Arc<OnceCell<Arc<dyn CredentialValidator>>>,
    factory: Arc<ValidatorFactory>,
}

impl LazyValidator {
    /// Defer construction to `factory`, invoked on first use.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn CredentialValidator>, ValidationError> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            factory: Arc::new(factory),
        }
    }

    /// Wrap an already constructed validator.
    pub fn ready(validator: Arc<dyn CredentialValidator>) -> Self {
        let factory_copy = validator.clone();
        Self {
            cell: Arc::new(OnceCell::new_with(Some(validator))),
            factory: Arc::new(move || Ok(factory_copy.clone())),
        }
    }

    /// Whether the validator has been constructed yet.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    /// Get the shared validator, constructing it if needed.
    pub async fn get(&self) -> Result<Arc<dyn CredentialValidator>, ValidationError> {
        self.cell
            .get_or_try_init(|| async { (self.factory)() })
            .await
            .cloned()
    }
}

impl std::fmt::Debug for LazyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyValidator")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
