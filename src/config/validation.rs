//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the origin is a usable absolute URL
//! - Validate value ranges (ports, timeouts)
//! - Detect conflicting ports in TLS mode
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::rewrite::Origin;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.origin: {0}")]
    Origin(String),
    #[error("upstream.local_prefix must start with '/' (got {0:?})")]
    LocalPrefix(String),
    #[error("listener.port must be non-zero")]
    ZeroPort,
    #[error("tls.redirect_port {0} collides with the TLS listener port")]
    RedirectPortConflict(u16),
    #[error("tls.{0} must not be empty")]
    EmptyTlsField(&'static str),
    #[error("cookie_domains contains an empty source domain")]
    EmptyCookieDomain,
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Origin::parse(&config.upstream.origin) {
        errors.push(ValidationError::Origin(e.to_string()));
    }

    if !config.upstream.local_prefix.starts_with('/') {
        errors.push(ValidationError::LocalPrefix(config.upstream.local_prefix.clone()));
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.tls_active() {
        if config.tls.redirect_port == config.listener.port {
            errors.push(ValidationError::RedirectPortConflict(config.tls.redirect_port));
        }
        if config.tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsField("cert_path"));
        }
        if config.tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsField("key_path"));
        }
        if config.tls.ca_cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsField("ca_cert_path"));
        }
        if config.tls.ca_key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsField("ca_key_path"));
        }
        if config.tls.domains.is_empty() {
            errors.push(ValidationError::EmptyTlsField("domains"));
        }
    }

    if config.cookie_domains.keys().any(|k| k.is_empty()) {
        errors.push(ValidationError::EmptyCookieDomain);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
