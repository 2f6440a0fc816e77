//! Host-side collaborators the module registers with.
//!
//! # Data Flow
//! ```text
//! config file sections
//!     → context.rs (which section a directive appeared in)
//!     → store.rs (per-scope module config: main server + virtual hosts)
//!
//! bound sockets
//!     → listeners.rs (registry walked by the module initializer)
//! ```
//!
//! # Design Decisions
//! - The module sees the host only through these types
//! - The store is generic over the module's config type

pub mod context;
pub mod listeners;
pub mod store;

pub use context::{CommandContext, ContextError};
pub use listeners::{ListenRecord, ListenerRegistry};
pub use store::{ConfigStore, ScopeId};
