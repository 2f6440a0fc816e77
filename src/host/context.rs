//! Command context: where in the configuration a directive appeared.

use thiserror::Error;

/// Section a directive was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandContext {
    /// Main server, outside every section.
    Global,
    /// Inside `<VirtualHost ...>`.
    VirtualHost { server_name: String },
    /// Inside `<Directory ...>`.
    Directory(String),
    /// Inside `<Location ...>`.
    Location(String),
    /// Inside `<Files ...>`.
    Files(String),
}

/// A global-only directive appeared inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{directive} cannot occur within {section} section")]
pub struct ContextError {
    pub directive: String,
    pub section: &'static str,
}

impl CommandContext {
    /// Section tag as written in the configuration file.
    pub fn section(&self) -> Option<&'static str> {
        match self {
            CommandContext::Global => None,
            CommandContext::VirtualHost { .. } => Some("<VirtualHost>"),
            CommandContext::Directory(_) => Some("<Directory>"),
            CommandContext::Location(_) => Some("<Location>"),
            CommandContext::Files(_) => Some("<Files>"),
        }
    }

    /// Reject `directive` unless it appears at global scope.
    pub fn check_global_only(&self, directive: &str) -> Result<(), ContextError> {
        match self.section() {
            None => Ok(()),
            Some(section) => Err(ContextError {
                directive: directive.to_string(),
                section,
            }),
        }
    }
}
