//! Identity-provider client: verifies JWT access tokens against the
//! provider's published JWKS.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::sync::Cache;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::validator::{CredentialValidator, ValidationError, ValidationOptions};

const JWKS_PATH: &str = "keys";
const MAX_CACHED_KEYS: u64 = 100;
const KEY_TTL: Duration = Duration::from_secs(3600);
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_JWKS_BYTES: u64 = 512 * 1024;
const CLOCK_SKEW_LEEWAY_SECS: u64 = 30;

/// Connection settings for the identity provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdentityProviderSettings {
    /// Environment base URL, e.g. `https://acme.example-idp.com`.
    pub env_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl IdentityProviderSettings {
    pub fn is_complete(&self) -> bool {
        !self.env_url.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl std::fmt::Debug for IdentityProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProviderSettings")
            .field("env_url", &self.env_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// The subset of access-token claims the client inspects itself.
/// `exp`, `aud` and `iss` are checked by `jsonwebtoken`.
#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    scopes: Option<Vec<String>>,
}

impl AccessTokenClaims {
    /// Scopes from either the RFC 8693 `scope` string or a `scopes` array.
    fn granted_scopes(&self) -> Vec<&str> {
        let mut granted: Vec<&str> = self
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default();
        if let Some(list) = &self.scopes {
            granted.extend(list.iter().map(String::as_str));
        }
        granted
    }
}

/// JWKS-backed token validator for one identity-provider environment.
///
/// Signing keys are cached by `kid` and refreshed on a cache miss. Only
/// keys are cached; every token is verified on every call.
#[derive(Clone)]
pub struct IdentityProviderClient {
    client_id: String,
    issuer: String,
    jwks_uri: Url,
    http: Client,
    keys: Cache<String, Arc<DecodingKey>>,
}

impl IdentityProviderClient {
    /// Build a client. Fails when any credential is missing.
    pub fn new(settings: &IdentityProviderSettings) -> Result<Self, ValidationError> {
        if !settings.is_complete() {
            return Err(ValidationError::Misconfigured(
                "SK_ENV_URL / SK_CLIENT_ID / SK_CLIENT_SECRET must all be set".to_string(),
            ));
        }

        let issuer = settings.env_url.trim_end_matches('/').to_string();
        let jwks_uri = Url::parse(&format!("{}/{}", issuer, JWKS_PATH))
            .map_err(|_| ValidationError::Misconfigured("SK_ENV_URL is not a valid URL".into()))?;

        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("greeting-server/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|_| ValidationError::Misconfigured("HTTP client could not be built".into()))?;

        Ok(Self {
            client_id: settings.client_id.clone(),
            issuer,
            jwks_uri,
            http,
            keys: Cache::builder()
                .max_capacity(MAX_CACHED_KEYS)
                .time_to_live(KEY_TTL)
                .build(),
        })
    }

    /// Override the JWKS location (defaults to `<env_url>/keys`).
    pub fn with_jwks_uri(mut self, jwks_uri: Url) -> Self {
        self.jwks_uri = jwks_uri;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn jwks_uri(&self) -> &Url {
        &self.jwks_uri
    }

    async fn signing_key(&self, kid: &str) -> Result<Arc<DecodingKey>, ValidationError> {
        if let Some(key) = self.keys.get(kid) {
            return Ok(key);
        }

        self.refresh_keys().await?;
        self.keys.get(kid).ok_or(ValidationError::KeyUnavailable)
    }

    async fn refresh_keys(&self) -> Result<(), ValidationError> {
        tracing::info!(event = "jwks_refresh", uri = %self.jwks_uri);

        let response = self
            .http
            .get(self.jwks_uri.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "JWKS endpoint returned an error");
            return Err(ValidationError::Unavailable);
        }
        if response.content_length().is_some_and(|len| len > MAX_JWKS_BYTES) {
            tracing::warn!("JWKS response exceeds size limit");
            return Err(ValidationError::Unavailable);
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|_| ValidationError::Unavailable)?;

        let mut loaded = 0usize;
        for key in jwks.keys {
            let (Some(kid), Some(n), Some(e)) = (key.kid, key.n, key.e) else {
                continue;
            };
            if key.kty != "RSA" {
                continue;
            }
            if let Ok(decoding_key) = DecodingKey::from_rsa_components(&n, &e) {
                self.keys.insert(kid, Arc::new(decoding_key));
                loaded += 1;
            }
        }
        tracing::debug!(keys = loaded, "JWKS refreshed");
        Ok(())
    }
}

fn classify_transport_error(error: reqwest::Error) -> ValidationError {
    if error.is_timeout() {
        ValidationError::Timeout
    } else {
        ValidationError::Unavailable
    }
}

fn classify_jwt_error(kind: &ErrorKind) -> ValidationError {
    match kind {
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => ValidationError::Expired,
        ErrorKind::InvalidAudience => ValidationError::AudienceMismatch,
        ErrorKind::InvalidIssuer => ValidationError::IssuerMismatch,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            ValidationError::InvalidSignature
        }
        _ => ValidationError::Malformed,
    }
}

#[async_trait]
impl CredentialValidator for IdentityProviderClient {
    async fn validate(
        &self,
        token: &str,
        options: &ValidationOptions,
    ) -> Result<(), ValidationError> {
        let header = decode_header(token).map_err(|_| ValidationError::Malformed)?;
        if !matches!(
            header.alg,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
        ) {
            return Err(ValidationError::InvalidSignature);
        }
        let kid = header.kid.ok_or(ValidationError::Malformed)?;
        let key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = CLOCK_SKEW_LEEWAY_SECS;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        if options.audience.is_empty() {
            return Err(ValidationError::AudienceMismatch);
        }
        validation.set_audience(&options.audience);

        let data = decode::<AccessTokenClaims>(token, &key, &validation)
            .map_err(|e| classify_jwt_error(e.kind()))?;

        if let Some(required) = options.required_scopes.as_deref() {
            let granted = data.claims.granted_scopes();
            if !required.iter().all(|s| granted.contains(&s.as_str())) {
                return Err(ValidationError::InsufficientScope);
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for IdentityProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityProviderClient")
            .field("client_id", &self.client_id)
            .field("issuer", &self.issuer)
            .field("jwks_uri", &self.jwks_uri.as_str())
            .finish()
    }
}

#[cfg(test)]
#[path = "idp_tests.rs"]
mod tests;
