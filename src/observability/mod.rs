//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Request correlation:
//!     x-request-id set or propagated by the HTTP layer, recorded in log fields
//! ```

pub mod logging;
