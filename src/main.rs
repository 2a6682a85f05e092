//! Single-origin reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                    ORIGIN PROXY                      │
//!                    │                                                      │
//!   Client Request   │  ┌─────────┐   ┌───────────┐   ┌──────────────┐      │
//!  ──────────────────┼─▶│  net    │──▶│ http      │──▶│  rewrite     │      │
//!                    │  │listener │   │ server    │   │ path, hosts  │      │
//!                    │  └─────────┘   └───────────┘   └──────┬───────┘      │
//!                    │                                       ▼              │
//!   Client Response  │  ┌─────────┐   ┌───────────┐   ┌──────────────┐      │
//!  ◀─────────────────┼──│response │◀──│ hyper     │◀──│   upstream   │◀─────┼── Origin
//!                    │  │cookies  │   │ client    │   │  round trip  │      │
//!                    │  └─────────┘   └───────────┘   └──────────────┘      │
//!                    │                                                      │
//!                    │  config · lifecycle (startup/TLS/shutdown) · logging │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use origin_proxy::cli::Cli;
use origin_proxy::lifecycle::{signals, startup, Shutdown};
use origin_proxy::net::tls::install_crypto_provider;
use origin_proxy::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability.log_level);
    install_crypto_provider();

    tracing::info!("origin-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        port = config.listener.port,
        tls = config.tls_active(),
        origin = %config.upstream.origin,
        local_prefix = %config.upstream.local_prefix,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    if let Err(e) = startup::run(config, &shutdown).await {
        tracing::error!(error = %e, "Proxy failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
