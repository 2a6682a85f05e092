//! Upstream origin and local prefix descriptors.
//!
//! Both are parsed once at startup and never mutated afterwards.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Error raised when the configured origin cannot be used as an upstream.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid origin URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported origin scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),
    #[error("origin URL has no host")]
    MissingHost,
}

/// Transport schemes the forwarding engine can speak to an upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single upstream every request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Upstream transport scheme.
    pub scheme: Scheme,
    /// `host[:port]`; the port is only present when it is not the scheme default.
    pub host: String,
    /// Path on the upstream that forwarded paths are joined onto. May be empty.
    pub base_path: String,
}

impl Origin {
    /// Parse an absolute `http`/`https` URL into an origin descriptor.
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let url = Url::parse(raw)?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(OriginError::UnsupportedScheme(other.to_string())),
        };

        let host = url.host_str().ok_or(OriginError::MissingHost)?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            scheme,
            host,
            base_path: url.path().to_string(),
        })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.base_path)
    }
}

/// Inbound path prefix stripped before joining with [`Origin::base_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPrefix(String);

impl LocalPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte length of the prefix.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Router patterns covering the prefix itself and everything below it.
    pub fn route_patterns(&self) -> Vec<String> {
        let trimmed = self.0.trim_end_matches('/');
        if trimmed.is_empty() {
            return vec!["/".to_string(), "/{*rest}".to_string()];
        }
        if self.0.ends_with('/') {
            vec![format!("{}/", trimmed), format!("{}/{{*rest}}", trimmed)]
        } else {
            // `{*rest}` never matches an empty remainder, so `/api/` needs its own route.
            vec![
                trimmed.to_string(),
                format!("{}/", trimmed),
                format!("{}/{{*rest}}", trimmed),
            ]
        }
    }
}

impl fmt::Display for LocalPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
