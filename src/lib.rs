//! Listener socket option tuning module.
//!
//! Applies `TCP_DEFER_ACCEPT`, `SO_SNDTIMEO`, `SO_RCVTIMEO`, `SO_SNDBUF` and
//! `SO_RCVBUF` to a server's listening sockets at startup and on every
//! graceful restart, driven by global-only configuration directives.

pub mod config;
pub mod host;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod sockopts;

pub use config::schema::ServerConfig;
pub use lifecycle::Server;
pub use sockopts::{SocketOptionsConfig, SockoptsModule};
