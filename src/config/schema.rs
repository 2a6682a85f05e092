//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Port that switches the listener into TLS mode on its own.
pub const TLS_PORT: u16 = 443;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// The single upstream and the local prefix forwarded to it.
    pub upstream: UpstreamConfig,

    /// Cookie `Domain` rewrites, `"*"` being the fallback entry.
    pub cookie_domains: BTreeMap<String, String>,

    /// Local certificate provisioning and HTTPS redirect.
    pub tls: TlsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// TLS is terminated when explicitly enabled or when listening on 443.
    pub fn tls_active(&self) -> bool {
        self.tls.enabled || self.listener.port == TLS_PORT
    }

    /// Scheme inbound clients use to reach this proxy.
    pub fn inbound_scheme(&self) -> &'static str {
        if self.tls_active() {
            "https"
        } else {
            "http"
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Port to accept proxied traffic on.
    pub port: u16,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        bind_address(&self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute URL of the origin (scheme, host, optional base path).
    pub origin: String,

    /// Inbound path prefix routed to the origin.
    pub local_prefix: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "https://postman-echo.com/".to_string(),
            local_prefix: "/something/".to_string(),
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Terminate TLS regardless of the listener port.
    pub enabled: bool,

    /// Path to certificate file (PEM). Relative paths resolve against the working directory.
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,

    /// Local CA certificate that issues the listener certificate. Install it
    /// in the client trust store to trust the proxy.
    pub ca_cert_path: String,

    /// Private key of the local CA.
    pub ca_key_path: String,

    /// Names the generated certificate is issued for.
    pub domains: Vec<String>,

    /// Plaintext port that redirects to HTTPS.
    pub redirect_port: u16,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cert_path: "localhost-cert.pem".to_string(),
            key_path: "localhost-key.pem".to_string(),
            ca_cert_path: "origin-proxy-ca.pem".to_string(),
            ca_key_path: "origin-proxy-ca-key.pem".to_string(),
            domains: vec!["localhost".to_string()],
            redirect_port: 80,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error, or a full `EnvFilter` string).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Format a `host:port` bind address, bracketing IPv6 literals.
pub fn bind_address(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
