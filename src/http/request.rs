//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract the inbound host
//! - Rewrite the outbound request for the upstream (the director)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The director mutates the request parts in place; the body is never touched
//! - Forwarding headers written here are appended, never replaced

use axum::http::header::{HeaderName, HeaderValue, HOST};
use axum::http::request::Parts;
use axum::http::uri::InvalidUri;
use axum::http::{Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::rewrite::{Origin, RewriteRules};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Host the client originally asked for.
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// Upstream host the request is forwarded to.
pub const X_ORIGIN_HOST: HeaderName = HeaderName::from_static("x-origin-host");

/// Generates a fresh UUID v4 for requests arriving without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The host the client addressed: the `Host` header, else the URI authority.
pub fn inbound_host(parts: &Parts) -> String {
    parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Point the request at the upstream origin.
///
/// Sets scheme and authority, replaces the path with the rewritten one (the
/// query string is carried over untouched) and appends `X-Forwarded-Host` and
/// `X-Origin-Host` to whatever values are already present.
pub fn rewrite_request(
    parts: &mut Parts,
    rules: &RewriteRules,
    inbound_host: &str,
) -> Result<(), InvalidUri> {
    let origin = &rules.origin;

    if let Ok(value) = HeaderValue::from_str(inbound_host) {
        parts.headers.append(X_FORWARDED_HOST, value);
    }
    if let Ok(value) = HeaderValue::from_str(&origin.host) {
        parts.headers.append(X_ORIGIN_HOST, value);
    }

    let path = rules.outbound_path(parts.uri.path());
    parts.uri = upstream_uri(origin, &path, parts.uri.query())?;
    Ok(())
}

/// Absolute upstream URI for a rewritten path and the original query.
pub fn upstream_uri(origin: &Origin, path: &str, query: Option<&str>) -> Result<Uri, InvalidUri> {
    let uri = match query {
        Some(q) => format!("{}://{}{}?{}", origin.scheme, origin.host, path, q),
        None => format!("{}://{}{}", origin.scheme, origin.host, path),
    };
    Uri::try_from(uri)
}
