//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listen addresses (config)
//!     → listener.rs (socket, bind, listen)
//!     → ListenerRegistry handed to module initializers
//! ```
//!
//! # Design Decisions
//! - Listeners are owned by the server, modules only see raw descriptors
//! - No connections are accepted by the harness

pub mod listener;

pub use listener::{bind_all, registry, BoundListener, ListenerError};
