//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, prefix routes, request ID)
//!     → forwarded.rs (forwarding header defaults)
//!     → request.rs (director: scheme, host, path, X-Forwarded-Host)
//!     → upstream round trip (hyper client)
//!     → response.rs (hop-by-hop stripping, Set-Cookie domain rewrite)
//!     → Send to client
//!
//! Plaintext companion of a TLS listener:
//!     → redirect.rs (302 to https://host:tls_port/path?query)
//! ```

pub mod forwarded;
pub mod redirect;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_FORWARDED_HOST, X_ORIGIN_HOST, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
