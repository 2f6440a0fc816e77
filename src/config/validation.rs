//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Listen addresses parse and are not repeated
//! - Value ranges (backlog > 0, known log level)
//! - Directive names are unique per scope, ignoring case
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Directive values are not checked here; the module owns their meaning

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{DirectiveArgs, ServerConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no listen addresses configured")]
    NoListeners,

    #[error("listen address '{0}' is not a valid socket address")]
    InvalidListenAddress(String),

    #[error("listen address '{0}' is given more than once")]
    DuplicateListenAddress(String),

    #[error("backlog must be positive, got {0}")]
    InvalidBacklog(i32),

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),

    #[error("virtual host #{0} has an empty server_name")]
    EmptyServerName(usize),

    /// Names match case-insensitively, so `SoSoSndBuf` and `sososndbuf`
    /// are the same directive.
    #[error("directive '{name}' is given more than once in {scope}")]
    DuplicateDirective { scope: String, name: String },
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen.is_empty() {
        errors.push(ValidationError::NoListeners);
    }

    let mut seen = HashSet::new();
    for addr in &config.listen {
        match addr.parse::<SocketAddr>() {
            Ok(parsed) => {
                // Port 0 asks the kernel for a fresh port each time.
                if parsed.port() != 0 && !seen.insert(parsed) {
                    errors.push(ValidationError::DuplicateListenAddress(addr.clone()));
                }
            }
            Err(_) => errors.push(ValidationError::InvalidListenAddress(addr.clone())),
        }
    }

    if config.backlog <= 0 {
        errors.push(ValidationError::InvalidBacklog(config.backlog));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    check_directive_names("global configuration", &config.directives, &mut errors);

    for (i, vh) in config.virtual_hosts.iter().enumerate() {
        if vh.server_name.trim().is_empty() {
            errors.push(ValidationError::EmptyServerName(i));
        }
        let scope = format!("<VirtualHost {}>", vh.server_name);
        check_directive_names(&scope, &vh.directives, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_directive_names(
    scope: &str,
    directives: &BTreeMap<String, DirectiveArgs>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for name in directives.keys() {
        if !seen.insert(name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateDirective {
                scope: scope.to_string(),
                name: name.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::VirtualHostConfig;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut cfg = ServerConfig::default();
        cfg.listen = vec![
            "127.0.0.1:80".into(),
            "not-an-address".into(),
            "127.0.0.1:80".into(),
        ];
        cfg.backlog = 0;
        cfg.observability.log_level = "loud".into();
        cfg.virtual_hosts.push(VirtualHostConfig {
            server_name: " ".into(),
            directives: Default::default(),
        });

        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidListenAddress("not-an-address".into()),
                ValidationError::DuplicateListenAddress("127.0.0.1:80".into()),
                ValidationError::InvalidBacklog(0),
                ValidationError::InvalidLogLevel("loud".into()),
                ValidationError::EmptyServerName(0),
            ]
        );
    }

    #[test]
    fn empty_listen_list_is_rejected() {
        let mut cfg = ServerConfig::default();
        cfg.listen.clear();
        assert_eq!(validate_config(&cfg), Err(vec![ValidationError::NoListeners]));
    }

    #[test]
    fn ephemeral_ports_may_repeat() {
        let mut cfg = ServerConfig::default();
        cfg.listen = vec!["127.0.0.1:0".into(), "127.0.0.1:0".into()];
        assert_eq!(validate_config(&cfg), Ok(()));
    }

    #[test]
    fn directive_names_differing_only_in_case_are_rejected() {
        let mut cfg = ServerConfig::default();
        cfg.directives.insert("sososndbuf".into(), DirectiveArgs::Int(2));
        cfg.directives.insert("SoSoSndBuf".into(), DirectiveArgs::Int(1));
        cfg.directives.insert("SoSoRcvBuf".into(), DirectiveArgs::Int(1));
        let mut vh = VirtualHostConfig {
            server_name: "www.example.com".into(),
            directives: Default::default(),
        };
        vh.directives.insert("SOTCPDEFERACCEPT".into(), DirectiveArgs::Int(1));
        vh.directives.insert("SoTcpDeferAccept".into(), DirectiveArgs::Int(2));
        cfg.virtual_hosts.push(vh);

        assert_eq!(
            validate_config(&cfg),
            Err(vec![
                ValidationError::DuplicateDirective {
                    scope: "global configuration".into(),
                    name: "sososndbuf".into(),
                },
                ValidationError::DuplicateDirective {
                    scope: "<VirtualHost www.example.com>".into(),
                    name: "SoTcpDeferAccept".into(),
                },
            ])
        );
    }

    #[test]
    fn same_directive_in_different_scopes_is_allowed() {
        let mut cfg = ServerConfig::default();
        cfg.directives.insert("SoSoSndBuf".into(), DirectiveArgs::Int(1));
        let mut vh = VirtualHostConfig {
            server_name: "www.example.com".into(),
            directives: Default::default(),
        };
        vh.directives.insert("sososndbuf".into(), DirectiveArgs::Int(2));
        cfg.virtual_hosts.push(vh);
        assert_eq!(validate_config(&cfg), Ok(()));
    }
}
