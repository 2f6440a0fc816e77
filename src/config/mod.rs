//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → loader.rs configure_module (directives → module, per scope)
//!     → ConfigStore (main server + virtual hosts)
//!
//! On SIGHUP or file change:
//!     watcher.rs reports the change
//!     → lifecycle restarts: reload, re-run directives, re-apply to listeners
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{configure_module, load_config, parse_config, ConfigError};
pub use schema::{DirectiveArgs, LogFormat, ObservabilityConfig, ServerConfig, VirtualHostConfig};
