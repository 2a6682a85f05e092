//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Report bind failures with the address that failed
//!
//! # Design Decisions
//! - Binding happens before any server task is spawned, so a failure aborts startup
//! - Binding to port 0 is allowed and reported through `local_addr` (tests rely on it)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::schema::bind_address;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind a TCP listener on `host:port`.
pub async fn bind_listener(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let address = bind_address(host, port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.clone(),
            source,
        })?;

    match listener.local_addr() {
        Ok(local) => tracing::info!(address = %local, "Listener bound"),
        Err(e) => tracing::warn!(
            address = %address,
            error = %e,
            "Listener bound, local address unavailable"
        ),
    }

    Ok(listener)
}
