//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration and build the rewrite rules
//! - Provision TLS material (local CA and listener certificate) when terminating HTTPS
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: configuration, bind and TLS load errors are fatal
//! - Certificate generation failure is only logged; loading the files afterwards decides
//! - Listeners start last (traffic only when ready)

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{validate_config, ConfigError, ProxyConfig};
use crate::http::redirect::run_redirect_server;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{
    bind_listener, ensure_certificate, load_tls_config, CertificatePaths, ListenerError, TlsError,
};
use crate::rewrite::{OriginError, RewriteRules};

/// Error type for anything that stops the proxy from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid upstream origin: {0}")]
    Origin(#[from] OriginError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Tls(#[from] TlsError),
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Validate the configuration and build the shared rewrite rules.
pub fn prepare(config: &ProxyConfig) -> Result<Arc<RewriteRules>, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;
    let rules = RewriteRules::from_config(config)?;

    tracing::info!(
        origin = %rules.origin,
        local_prefix = %rules.local_prefix,
        cookie_domains = rules.cookie_domains.len(),
        "Rewrite rules loaded"
    );
    Ok(Arc::new(rules))
}

/// Run the proxy until `shutdown` is triggered.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let rules = prepare(&config)?;

    if config.tls_active() {
        run_tls(config, rules, shutdown).await
    } else {
        let listener = bind_listener(&config.listener.bind_host, config.listener.port).await?;
        let server = HttpServer::new(config, rules);
        server.run(listener, shutdown.subscribe()).await?;
        Ok(())
    }
}

async fn run_tls(
    config: ProxyConfig,
    rules: Arc<RewriteRules>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let base_dir = std::env::current_dir().unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            "Working directory unavailable, using relative certificate paths"
        );
        PathBuf::new()
    });
    let paths = CertificatePaths::resolve(&config.tls, &base_dir);

    if let Err(e) = ensure_certificate(&paths, &config.tls.domains) {
        tracing::error!(error = %e, "Certificate provisioning failed");
    }
    let tls = load_tls_config(&paths).await?;

    let tls_port = config.listener.port;
    let listener = bind_listener(&config.listener.bind_host, tls_port).await?;
    let redirect_listener =
        bind_listener(&config.listener.bind_host, config.tls.redirect_port).await?;

    let redirect_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if let Err(e) = run_redirect_server(redirect_listener, tls_port, redirect_shutdown).await {
            tracing::error!(error = %e, "HTTPS redirect server failed");
        }
    });

    let server = HttpServer::new(config, rules);
    server.run_tls(listener, tls, shutdown.subscribe()).await?;
    Ok(())
}
