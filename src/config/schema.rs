//! Configuration schema definitions.
//!
//! The harness reads one TOML file describing the main server, its virtual
//! hosts, and the module directives given in each. Directive values are kept
//! as raw strings here; the module decides how to interpret them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sockopts::ParsePolicy;

/// Root configuration for a server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Addresses to listen on (e.g., "0.0.0.0:80").
    pub listen: Vec<String>,

    /// Accept queue length passed to `listen(2)`.
    pub backlog: i32,

    /// Reject directive values that are not clean integers instead of
    /// converting them best-effort.
    pub strict_directive_values: bool,

    /// Directives given at global scope, by name.
    pub directives: BTreeMap<String, DirectiveArgs>,

    /// `<VirtualHost>` sections.
    pub virtual_hosts: Vec<VirtualHostConfig>,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: vec!["0.0.0.0:8080".to_string()],
            backlog: 511,
            strict_directive_values: false,
            directives: BTreeMap::new(),
            virtual_hosts: Vec::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ServerConfig {
    /// How the module should convert directive values.
    pub fn parse_policy(&self) -> ParsePolicy {
        if self.strict_directive_values {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Lenient
        }
    }
}

/// Arguments of one directive line.
///
/// `SoSoSndBuf = 512`, `SoSoSndBuf = "512"` and `SoSoSndBuf = ["512"]` are
/// the same directive with one argument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DirectiveArgs {
    Int(i64),
    One(String),
    Many(Vec<String>),
}

impl DirectiveArgs {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            DirectiveArgs::Int(v) => vec![v.to_string()],
            DirectiveArgs::One(s) => vec![s.clone()],
            DirectiveArgs::Many(v) => v.clone(),
        }
    }
}

/// A `<VirtualHost>` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VirtualHostConfig {
    /// Host name the section serves.
    pub server_name: String,

    /// Directives given inside the section.
    #[serde(default)]
    pub directives: BTreeMap<String, DirectiveArgs>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
