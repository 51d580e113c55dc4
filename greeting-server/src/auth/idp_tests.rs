use super::*;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, EncodingKey, Header};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::json;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUDIENCE: &str = "https://greeting.example.com";
const KID: &str = "test-key-1";

struct TestKey {
    private_pem: String,
    n: String,
    e: String,
}

/// RSA key generation is slow in debug builds; share one key per test binary.
fn test_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let public = private.to_public_key();
        TestKey {
            private_pem: private.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            n: URL_SAFE_NO_PAD.encode(public.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public.e().to_bytes_be()),
        }
    })
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn sign(claims: serde_json::Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(test_key().private_pem.as_bytes()).unwrap(),
    )
    .unwrap()
}

fn claims(issuer: &str, audience: &str, exp: u64, scopes: &[&str]) -> serde_json::Value {
    json!({
        "sub": "user-123",
        "iss": issuer,
        "aud": [audience],
        "exp": exp,
        "iat": now(),
        "scopes": scopes,
    })
}

async fn jwks_server() -> MockServer {
    let server = MockServer::start().await;
    let key = test_key();
    Mock::given(method("GET"))
        .and(path("/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{ "kid": KID, "kty": "RSA", "alg": "RS256", "use": "sig", "n": key.n, "e": key.e }]
        })))
        .mount(&server)
        .await;
    server
}

fn client_for(server: &MockServer) -> IdentityProviderClient {
    IdentityProviderClient::new(&IdentityProviderSettings {
        env_url: server.uri(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    })
    .unwrap()
}

fn options(scopes: Option<&[&str]>) -> ValidationOptions {
    ValidationOptions::for_audience(AUDIENCE)
        .with_required_scopes(scopes.map(|s| s.iter().map(|x| x.to_string()).collect()))
}

#[tokio::test]
async fn test_valid_token_with_required_scope() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(claims(&server.uri(), AUDIENCE, now() + 600, &["usr:read"]), KID);

    client
        .validate(&token, &options(Some(&["usr:read"])))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_space_delimited_scope_claim() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(
        json!({
            "iss": server.uri(),
            "aud": AUDIENCE,
            "exp": now() + 600,
            "scope": "todo:read todo:write",
        }),
        KID,
    );

    client
        .validate(&token, &options(Some(&["todo:write"])))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_scope_rejected() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(claims(&server.uri(), AUDIENCE, now() + 600, &["other"]), KID);

    let err = client
        .validate(&token, &options(Some(&["usr:read"])))
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::InsufficientScope);

    // Without required scopes the same token is fine.
    client.validate(&token, &options(None)).await.unwrap();
}

#[tokio::test]
async fn test_wrong_audience_rejected() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(
        claims(&server.uri(), "https://elsewhere.example.com", now() + 600, &[]),
        KID,
    );

    let err = client.validate(&token, &options(None)).await.unwrap_err();
    assert_eq!(err, ValidationError::AudienceMismatch);
}

#[tokio::test]
async fn test_wrong_issuer_rejected() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(claims("https://evil.example.com", AUDIENCE, now() + 600, &[]), KID);

    let err = client.validate(&token, &options(None)).await.unwrap_err();
    assert_eq!(err, ValidationError::IssuerMismatch);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(claims(&server.uri(), AUDIENCE, now() - 3600, &[]), KID);

    let err = client.validate(&token, &options(None)).await.unwrap_err();
    assert_eq!(err, ValidationError::Expired);
}

#[tokio::test]
async fn test_unknown_kid_rejected() {
    let server = jwks_server().await;
    let client = client_for(&server);
    let token = sign(claims(&server.uri(), AUDIENCE, now() + 600, &[]), "rotated-away");

    let err = client.validate(&token, &options(None)).await.unwrap_err();
    assert_eq!(err, ValidationError::KeyUnavailable);
}

#[tokio::test]
async fn test_garbage_token_is_malformed() {
    let server = jwks_server().await;
    let client = client_for(&server);

    let err = client
        .validate("not-a-jwt", &options(None))
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::Malformed);
}

#[tokio::test]
async fn test_symmetric_algorithm_rejected_before_key_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(KID.to_string());
    let token = encode(
        &header,
        &claims(&server.uri(), AUDIENCE, now() + 600, &[]),
        &EncodingKey::from_secret(b"shared-secret"),
    )
    .unwrap();

    let err = client.validate(&token, &options(None)).await.unwrap_err();
    assert_eq!(err, ValidationError::InvalidSignature);
}

#[tokio::test]
async fn test_jwks_outage_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/keys"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = client_for(&server);
    let token = sign(claims(&server.uri(), AUDIENCE, now() + 600, &[]), KID);

    let err = client.validate(&token, &options(None)).await.unwrap_err();
    assert_eq!(err, ValidationError::Unavailable);
}

#[tokio::test]
async fn test_signing_keys_are_cached_between_calls() {
    let server = MockServer::start().await;
    let key = test_key();
    Mock::given(method("GET"))
        .and(path("/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{ "kid": KID, "kty": "RSA", "n": key.n, "e": key.e }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let token = sign(claims(&server.uri(), AUDIENCE, now() + 600, &[]), KID);

    client.validate(&token, &options(None)).await.unwrap();
    client.validate(&token, &options(None)).await.unwrap();
}

#[test]
fn test_missing_credentials_are_misconfigured() {
    let err = IdentityProviderClient::new(&IdentityProviderSettings {
        env_url: "https://idp.example.com".to_string(),
        client_id: "id".to_string(),
        client_secret: String::new(),
    })
    .unwrap_err();
    assert!(matches!(err, ValidationError::Misconfigured(_)));
}

#[test]
fn test_jwks_uri_and_issuer_derived_from_env_url() {
    let client = IdentityProviderClient::new(&IdentityProviderSettings {
        env_url: "https://idp.example.com/".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
    })
    .unwrap();
    assert_eq!(client.issuer(), "https://idp.example.com");
    assert_eq!(client.jwks_uri().as_str(), "https://idp.example.com/keys");
    assert_eq!(client.client_id(), "id");
}

#[test]
fn test_settings_debug_redacts_secret() {
    let settings = IdentityProviderSettings {
        env_url: "https://idp.example.com".to_string(),
        client_id: "id".to_string(),
        client_secret: "super-secret".to_string(),
    };
    let debug = format!("{:?}", settings);
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("<redacted>"));
}
