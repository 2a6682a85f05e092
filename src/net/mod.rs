//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → tls.rs (provision certificate if missing, load rustls config)
//!     → listener.rs (bind proxy and redirect sockets)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Certificate provisioning is synchronous and completes before any bind
//! - TLS is optional and handled transparently by axum-server

pub mod listener;
pub mod tls;

pub use listener::{bind_listener, ListenerError};
pub use tls::{ensure_certificate, load_tls_config, CertificatePaths, CertificateStatus, TlsError};
