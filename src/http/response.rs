//! Response handling and transformation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from the upstream response
//! - Rewrite the `Domain` attribute of every `Set-Cookie` header
//!
//! # Design Decisions
//! - Bodies stream through untouched
//! - Each `Set-Cookie` occurrence is rewritten on its own; cookies are never
//!   merged into one header line and their order is preserved
//! - Values that are not valid UTF-8 are forwarded as received

use axum::http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use axum::http::response::Parts;

use crate::http::forwarded::strip_hop_by_hop;
use crate::rewrite::{rewrite_cookie_domain, CookieDomainMap};

/// Prepare upstream response headers for the client.
pub fn prepare_response(parts: &mut Parts, cookie_domains: &CookieDomainMap) {
    strip_hop_by_hop(&mut parts.headers);
    let rewritten = rewrite_set_cookies(&mut parts.headers, cookie_domains);
    if rewritten > 0 {
        tracing::debug!(rewritten, "Rewrote Set-Cookie domains");
    }
}

/// Rewrite all `Set-Cookie` values in place. Returns how many values changed.
pub fn rewrite_set_cookies(headers: &mut HeaderMap, cookie_domains: &CookieDomainMap) -> usize {
    if cookie_domains.is_empty() || !headers.contains_key(SET_COOKIE) {
        return 0;
    }

    let originals: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    headers.remove(SET_COOKIE);

    let mut changed = 0;
    for original in originals {
        let value = original
            .to_str()
            .ok()
            .map(|raw| rewrite_cookie_domain(raw, cookie_domains))
            .filter(|rewritten| rewritten.as_bytes() != original.as_bytes())
            .and_then(|rewritten| HeaderValue::from_str(&rewritten).ok());

        match value {
            Some(value) => {
                changed += 1;
                headers.append(SET_COOKIE, value);
            }
            None => {
                headers.append(SET_COOKIE, original);
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, TRANSFER_ENCODING};
    use axum::http::Response;

    fn map() -> CookieDomainMap {
        CookieDomainMap::from([("old.domain", "new.domain"), ("*", "")])
    }

    #[test]
    fn every_occurrence_is_rewritten_separately() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Domain=old.domain; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("c=3; Domain=tracker.test; Secure"));

        let changed = rewrite_set_cookies(&mut headers, &map());

        assert_eq!(changed, 2);
        let values: Vec<_> = headers.get_all(SET_COOKIE).iter().collect();
        assert_eq!(
            values,
            vec!["a=1; Domain=new.domain; Path=/", "b=2; Path=/", "c=3; Secure"]
        );
    }

    #[test]
    fn non_utf8_values_pass_through() {
        let raw = HeaderValue::from_bytes(b"n=\xff; Domain=old.domain").unwrap();
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, raw.clone());

        assert_eq!(rewrite_set_cookies(&mut headers, &map()), 0);
        assert_eq!(headers.get(SET_COOKIE), Some(&raw));
    }

    #[test]
    fn empty_map_leaves_headers_alone() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Domain=old.domain"));
        assert_eq!(rewrite_set_cookies(&mut headers, &CookieDomainMap::default()), 0);
        assert_eq!(headers.get(SET_COOKIE).unwrap(), "a=1; Domain=old.domain");
    }

    #[test]
    fn prepare_strips_hop_by_hop() {
        let (mut parts, _) = Response::builder()
            .header(TRANSFER_ENCODING, "chunked")
            .header(CONTENT_TYPE, "text/plain")
            .header(SET_COOKIE, "a=1; Domain=old.domain")
            .body(())
            .unwrap()
            .into_parts();

        prepare_response(&mut parts, &map());

        assert!(parts.headers.get(TRANSFER_ENCODING).is_none());
        assert_eq!(parts.headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(parts.headers.get(SET_COOKIE).unwrap(), "a=1; Domain=new.domain");
    }
}
