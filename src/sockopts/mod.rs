//! Listener socket option module.
//!
//! # Data Flow
//! ```text
//! SoTcpDeferAccept / SoSoSndTimeo / SoSoRcvTimeo / SoSoSndBuf / SoSoRcvBuf
//!     → directives.rs (arity, global-only check, atoi-style value)
//!     → options.rs (SocketOptionsConfig in the main server's scope)
//!     → options.rs merge (virtual host over main, field by field)
//!
//! Server start / graceful restart:
//!     module.rs init
//!     → apply.rs (walk listeners, one setsockopt per set option)
//!     → warnings for failed options, startup continues
//! ```
//!
//! # Design Decisions
//! - A field is either unset or applied verbatim
//! - Runs once per (re)start, synchronously, before traffic is accepted

pub mod apply;
pub mod directives;
pub mod module;
pub mod options;

pub use apply::{apply_to_listeners, ApplyReport, OptionFailure, SocketOptionSetter, SystemSetter};
pub use directives::{Directive, DirectiveError, ParsePolicy, ParsedInt};
pub use module::{CommandParms, ServerModule, SockoptsModule};
pub use options::{OptionKind, SocketOption, SocketOptionsConfig, Timeval};
