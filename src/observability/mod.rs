//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! directives, listeners, module init
//!     → tracing events (structured fields: fd, option, directive, error)
//!     → logging.rs subscriber (pretty or JSON to stdout)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
