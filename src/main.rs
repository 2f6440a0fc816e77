//! sockopts: listener socket option harness
//!
//! Loads a server configuration, feeds its directives through the socket
//! options module, binds the listeners and applies the configured options.
//! Stays up to re-apply them on SIGHUP or when the config file changes.
//!
//! ```text
//!   sockopts.toml ──▶ loader ──▶ directives ──▶ ConfigStore (main + vhosts)
//!                                                   │
//!   listen addrs ──▶ bind ──▶ ListenerRegistry ─────┤
//!                                                   ▼
//!                                             module init ──▶ setsockopt × N
//!                                                   ▲
//!   SIGHUP / file change ──▶ supervisor ──▶ restart ┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::sync::mpsc;

use sockopts::config::watcher::ConfigWatcher;
use sockopts::config::{configure_module, load_config};
use sockopts::host::ScopeId;
use sockopts::lifecycle::{self, Server, Shutdown};
use sockopts::observability::init_logging;
use sockopts::sockopts::{Directive, ServerModule, SockoptsModule};

#[derive(Parser)]
#[command(name = "sockopts", version)]
#[command(about = "Apply socket options to a server's listening sockets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// The chosen subcommand, `run` when none was given.
    fn into_command(self) -> Commands {
        self.command.unwrap_or_else(|| Commands::Run {
            config: PathBuf::from(DEFAULT_CONFIG),
        })
    }
}

const DEFAULT_CONFIG: &str = "sockopts.toml";

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Bind listeners, apply options, and stay up for graceful restarts
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// Validate a configuration and print the effective options as JSON
    Check {
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
    /// List the directives this module understands
    Directives,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.into_command() {
        Commands::Run { config: path } => {
            let config = load_config(&path)?;
            init_logging(&config.observability);

            tracing::info!("sockopts v{} starting", env!("CARGO_PKG_VERSION"));

            let server = Server::start(&path, config)?;
            for failure in &server.last_report().failed {
                tracing::warn!(fd = failure.fd, option = %failure.kind, "Option not applied at startup");
            }

            let shutdown = Shutdown::new();
            let (tx, rx) = mpsc::unbounded_channel();
            let supervisor_stop = shutdown.subscribe();
            let signals = lifecycle::spawn_signal_listener(tx.clone(), shutdown.clone())?;

            // The watcher lives until shutdown fires.
            let watcher = match ConfigWatcher::new(&path, tx).spawn() {
                Ok(watcher) => {
                    let mut stop = shutdown.subscribe();
                    Some(tokio::spawn(async move {
                        let _ = stop.recv().await;
                        drop(watcher);
                        tracing::debug!("Config watcher stopped");
                    }))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, SIGHUP still restarts");
                    None
                }
            };

            let server = lifecycle::supervise(server, rx, supervisor_stop).await;
            drop(server);

            shutdown.trigger();
            tracing::debug!(tasks = shutdown.receiver_count(), "Waiting for background tasks");
            let _ = signals.await;
            if let Some(watcher) = watcher {
                let _ = watcher.await;
            }
            tracing::info!("Shutdown complete");
        }
        Commands::Check { config: path } => {
            let config = load_config(&path)?;
            let module = SockoptsModule::new(config.parse_policy());
            let store = configure_module(&config, &module)?;

            let virtual_hosts: Vec<_> = (0..store.virtual_host_count())
                .map(ScopeId::VirtualHost)
                .map(|scope| {
                    json!({
                        "server_name": store.server_name(scope),
                        "options": store.effective(scope, |p, c| module.merge_server_config(p, c)),
                    })
                })
                .collect();

            let report = json!({
                "listen": config.listen,
                "main": store.main(),
                "virtual_hosts": virtual_hosts,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Directives => {
            for directive in Directive::ALL {
                println!("{:<18} {}", directive.name(), directive.help());
            }
        }
    }

    Ok(())
}
