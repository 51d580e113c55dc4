//! Paths and the `WWW-Authenticate` challenge advertised on denial.

use axum::http::{header, HeaderMap, HeaderValue, Uri};

/// RPC endpoint path.
pub const MCP_PATH: &str = "/mcp";

/// Protected-resource metadata for the `/mcp` resource.
pub const METADATA_PATH: &str = "/.well-known/oauth-protected-resource/mcp";

/// Root protected-resource metadata (served by the process adapter only).
pub const ROOT_METADATA_PATH: &str = "/.well-known/oauth-protected-resource";

/// Any path containing this segment bypasses authorization.
pub const WELL_KNOWN_SEGMENT: &str = ".well-known";

const FALLBACK_CHALLENGE: &str = r#"Bearer realm="OAuth""#;

/// Best-effort `scheme://host` for the request.
///
/// An absolute request URI wins. Otherwise the scheme comes from
/// `X-Forwarded-Proto` (default `http`) and the host from `Host`.
pub fn request_origin(uri: &Uri, headers: &HeaderMap) -> String {
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{}://{}", scheme, authority);
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

/// Challenge pointing clients at this resource's metadata document.
pub fn challenge_value(origin: &str) -> HeaderValue {
    let value = format!(
        r#"Bearer realm="OAuth", resource_metadata="{}{}""#,
        origin, METADATA_PATH
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CHALLENGE))
}
