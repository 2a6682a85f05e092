//! Request and response rewriting rules.
//!
//! # Data Flow
//! ```text
//! ProxyConfig (startup)
//!     → origin.rs (parse upstream URL, local prefix)
//!     → cookie.rs (compile cookie domain map)
//!     → RewriteRules (immutable, shared via Arc)
//!
//! Per request:
//!     inbound path → path.rs (strip prefix, join onto base path)
//!     Set-Cookie   → cookie.rs → submatch.rs (regex replace by capture groups)
//! ```

pub mod cookie;
pub mod origin;
pub mod path;
pub mod submatch;

pub use cookie::{rewrite_cookie_domain, CookieDomainMap, Resolution};
pub use origin::{LocalPrefix, Origin, OriginError, Scheme};
pub use path::{outbound_path, single_joining_slash};

use crate::config::ProxyConfig;

/// Everything a request handler needs to rewrite traffic for the upstream.
#[derive(Debug, Clone)]
pub struct RewriteRules {
    pub origin: Origin,
    pub local_prefix: LocalPrefix,
    pub cookie_domains: CookieDomainMap,
}

impl RewriteRules {
    pub fn new(origin: Origin, local_prefix: LocalPrefix, cookie_domains: CookieDomainMap) -> Self {
        Self {
            origin,
            local_prefix,
            cookie_domains,
        }
    }

    /// Build the rules from configuration. Fails when the origin URL is unusable.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, OriginError> {
        Ok(Self {
            origin: Origin::parse(&config.upstream.origin)?,
            local_prefix: LocalPrefix::new(config.upstream.local_prefix.clone()),
            cookie_domains: CookieDomainMap::from(config.cookie_domains.clone()),
        })
    }

    /// Upstream path for an inbound path.
    pub fn outbound_path(&self, inbound: &str) -> String {
        outbound_path(inbound, self.local_prefix.len(), &self.origin.base_path)
    }
}
