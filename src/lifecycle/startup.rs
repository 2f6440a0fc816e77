//! Startup and graceful restart.
//!
//! # Responsibilities
//! - Turn a loaded configuration into module state
//! - Bind listeners
//! - Run the module initializer at start and on every restart
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners are bound before module init so options land on real sockets
//! - Restart keeps the bound listeners; listen changes need a full restart

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{configure_module, load_config, ConfigError, ServerConfig};
use crate::host::{ConfigStore, ListenerRegistry};
use crate::net::{self, BoundListener, ListenerError};
use crate::sockopts::{
    ApplyReport, ServerModule, SocketOptionSetter, SocketOptionsConfig,
    SockoptsModule, SystemSetter,
};

/// Fatal startup or restart failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// A running server: its configuration, module state and listeners.
pub struct Server<S = SystemSetter> {
    config_path: PathBuf,
    config: ServerConfig,
    store: ConfigStore<SocketOptionsConfig>,
    listeners: Vec<BoundListener>,
    module: SockoptsModule<S>,
    generation: u64,
    last_report: ApplyReport,
}

impl Server<SystemSetter> {
    /// Start with the real `setsockopt` backend.
    pub fn start(config_path: &Path, config: ServerConfig) -> Result<Self, StartupError> {
        Self::start_with_setter(config_path, config, SystemSetter)
    }
}

impl<S: SocketOptionSetter> Server<S> {
    /// Start, issuing socket option calls through `setter`.
    pub fn start_with_setter(
        config_path: &Path,
        config: ServerConfig,
        setter: S,
    ) -> Result<Self, StartupError> {
        let mut module = SockoptsModule::with_setter(config.parse_policy(), setter);
        let store = configure_module(&config, &module)?;

        tracing::info!(
            module = module.name(),
            listen = ?config.listen,
            virtual_hosts = store.virtual_host_count(),
            options = ?store.main(),
            "Configuration loaded"
        );

        let listeners = net::bind_all(&config.listen, config.backlog)?;
        let report = module.init(store.main(), &net::registry(&listeners));

        Ok(Self {
            config_path: config_path.to_path_buf(),
            config,
            store,
            listeners,
            module,
            generation: 0,
            last_report: report,
        })
    }

    /// Graceful restart: reload the config file, rebuild module state and
    /// re-apply options to the existing listeners.
    ///
    /// On error the running state is left untouched.
    pub fn restart(&mut self) -> Result<&ApplyReport, StartupError> {
        let config = load_config(&self.config_path)?;
        self.restart_with(config)
    }

    /// Graceful restart with an already loaded configuration.
    pub fn restart_with(&mut self, config: ServerConfig) -> Result<&ApplyReport, StartupError> {
        let policy = config.parse_policy();
        // Directive handling never touches the setter, so a plain module
        // can build the new store without disturbing the running one.
        let store = configure_module(&config, &SockoptsModule::new(policy))?;

        if config.listen != self.config.listen {
            tracing::warn!(
                running = ?self.config.listen,
                configured = ?config.listen,
                "Listen addresses changed, keeping current listeners until full restart"
            );
        }

        if self.module.policy() != policy {
            tracing::info!(
                from = ?self.module.policy(),
                to = ?policy,
                "Directive parse policy changed"
            );
        }
        self.module.set_policy(policy);
        self.config = config;
        self.store = store;
        self.generation += 1;

        let registry = self.registry();
        self.last_report = self.module.init(self.store.main(), &registry);
        tracing::info!(generation = self.generation, "Graceful restart complete");
        Ok(&self.last_report)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &ConfigStore<SocketOptionsConfig> {
        &self.store
    }

    pub fn listeners(&self) -> &[BoundListener] {
        &self.listeners
    }

    pub fn registry(&self) -> ListenerRegistry {
        net::registry(&self.listeners)
    }

    /// Number of graceful restarts so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Outcome of the latest module initialization.
    pub fn last_report(&self) -> &ApplyReport {
        &self.last_report
    }

    pub fn setter(&self) -> &S {
        self.module.setter()
    }
}
