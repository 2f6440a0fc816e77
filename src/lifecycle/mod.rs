//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Run directives → Bind listeners → Module init
//!
//! Restart (startup.rs, triggered via supervisor.rs):
//!     SIGHUP or config change → Reload → Run directives → Module init
//!     (listeners are kept, options re-applied)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown broadcast (shutdown.rs)
//!     SIGHUP → Graceful restart
//! ```
//!
//! # Design Decisions
//! - Fail fast at startup: any config or bind error is fatal
//! - A failed reload keeps the running configuration
//! - Module init runs before the server is considered up

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use signals::{spawn_signal_listener, LifecycleEvent, RestartReason};
pub use startup::{Server, StartupError};
pub use supervisor::supervise;
