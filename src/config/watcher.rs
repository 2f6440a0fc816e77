//! Configuration file watcher.
//!
//! A change to the config file is reported as a graceful restart request.
//! The parent directory is watched rather than the file itself so editors
//! that replace the file on save are still seen.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::lifecycle::{LifecycleEvent, RestartReason};

/// Watches one configuration file and forwards restart requests.
pub struct ConfigWatcher {
    path: PathBuf,
    events: mpsc::UnboundedSender<LifecycleEvent>,
}

impl ConfigWatcher {
    pub fn new(path: &Path, events: mpsc::UnboundedSender<LifecycleEvent>) -> Self {
        Self {
            path: path.to_path_buf(),
            events,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn spawn(self) -> Result<RecommendedWatcher, notify::Error> {
        let file_name = self.path.file_name().map(OsString::from);
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let events = self.events;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, file_name.as_deref()) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, requesting restart");
                        let _ = events.send(LifecycleEvent::Restart(RestartReason::ConfigChanged));
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Config watch error"),
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

fn touches(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    let Some(name) = file_name else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(name))
}
