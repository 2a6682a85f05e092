//! Forwarding header normalization and hop-by-hop hygiene.
//!
//! # Responsibilities
//! - Default `X-Forwarded-Host` / `X-Forwarded-Proto` when the client sent none
//! - Append the client address to `X-Forwarded-For`
//! - Send the upstream's own authority as `Host`
//! - Strip hop-by-hop headers in both directions
//!
//! # Ordering
//! The proxy handler runs these steps in a fixed order:
//! 1. [`apply_forwarding_defaults`] against the untouched inbound request, so
//!    `X-Forwarded-Proto` always reports the scheme the client used.
//! 2. The director (`request::rewrite_request`), which appends its own
//!    `X-Forwarded-Host` value. A request that arrived without the header
//!    therefore carries the inbound host twice.
//! 3. [`set_upstream_host`], then [`strip_hop_by_hop`] and [`append_forwarded_for`].

use std::net::IpAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::http::request::X_FORWARDED_HOST;
use crate::rewrite::Origin;

/// Scheme the client used to reach the proxy.
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Chain of client addresses.
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Hop-by-hop headers (RFC 7230 section 6.1) that must not be forwarded.
const HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Fill in `X-Forwarded-Host` and `X-Forwarded-Proto` when missing or empty.
///
/// Values already present are left exactly as received.
pub fn apply_forwarding_defaults(
    headers: &mut HeaderMap,
    inbound_host: &str,
    inbound_scheme: &str,
) {
    set_if_absent(headers, X_FORWARDED_HOST, inbound_host);
    set_if_absent(headers, X_FORWARDED_PROTO, inbound_scheme);
}

fn set_if_absent(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    let absent = headers.get(&name).map_or(true, |v| v.is_empty());
    if !absent {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

/// Replace `Host` with the upstream authority.
pub fn set_upstream_host(headers: &mut HeaderMap, origin: &Origin) {
    if let Ok(value) = HeaderValue::from_str(&origin.host) {
        headers.insert(header::HOST, value);
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Append the client IP to `X-Forwarded-For`, folding prior values into one line.
pub fn append_forwarded_for(headers: &mut HeaderMap, client: IpAddr) {
    let mut chain: Vec<String> = headers
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    chain.push(client.to_string());

    if let Ok(value) = HeaderValue::from_str(&chain.join(", ")) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
