//! Configuration loading from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{DirectiveArgs, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::host::{CommandContext, ConfigStore, ScopeId};
use crate::sockopts::{CommandParms, DirectiveError, ServerModule};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Syntax error in {scope}: {source}")]
    Directive {
        scope: String,
        #[source]
        source: DirectiveError,
    },

    #[error(
        "Invalid command '{name}' in {scope}, perhaps misspelled or defined by a module not included in the server configuration"
    )]
    UnknownDirective { scope: String, name: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Run every directive in `config` through `module`, building its per-scope
/// configuration store.
///
/// Global directives run first, then each virtual host's in declaration order.
pub fn configure_module<M: ServerModule>(
    config: &ServerConfig,
    module: &M,
) -> Result<ConfigStore<M::Config>, ConfigError> {
    let mut store = ConfigStore::new(module.create_server_config());

    run_directives(
        module,
        &mut store,
        &CommandContext::Global,
        ScopeId::Main,
        &config.directives,
    )?;

    for vh in &config.virtual_hosts {
        let scope = store.add_virtual_host(&vh.server_name, module.create_server_config());
        let context = CommandContext::VirtualHost {
            server_name: vh.server_name.clone(),
        };
        run_directives(module, &mut store, &context, scope, &vh.directives)?;
    }

    Ok(store)
}

fn run_directives<M: ServerModule>(
    module: &M,
    store: &mut ConfigStore<M::Config>,
    context: &CommandContext,
    scope: ScopeId,
    directives: &BTreeMap<String, DirectiveArgs>,
) -> Result<(), ConfigError> {
    let describe = || match context {
        CommandContext::VirtualHost { server_name } => format!("<VirtualHost {server_name}>"),
        _ => "global configuration".to_string(),
    };

    for (name, value) in directives {
        let args = value.to_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let mut cmd = CommandParms {
            context,
            scope,
            store: &mut *store,
        };
        match module.handle_directive(&mut cmd, name, &args) {
            Ok(true) => {}
            Ok(false) => {
                return Err(ConfigError::UnknownDirective {
                    scope: describe(),
                    name: name.clone(),
                })
            }
            Err(source) => {
                return Err(ConfigError::Directive {
                    scope: describe(),
                    source,
                })
            }
        }
    }
    Ok(())
}
