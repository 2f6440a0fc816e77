//! OS signal handling.
//!
//! SIGHUP becomes a restart request on the lifecycle channel, so the
//! supervisor sees signals and config-file changes the same way. SIGTERM and
//! SIGINT trigger the [`Shutdown`] broadcast.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Why a graceful restart was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    Signal,
    ConfigChanged,
}

/// Events driving the server after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Reload configuration and re-run module initialization.
    Restart(RestartReason),
}

/// Forward SIGHUP to `events` and turn SIGTERM or SIGINT into a shutdown.
///
/// The task ends once shutdown fires, from a signal or any other holder, or
/// when the event receiver closes.
pub fn spawn_signal_listener(
    events: mpsc::UnboundedSender<LifecycleEvent>,
    shutdown: Shutdown,
) -> std::io::Result<JoinHandle<()>> {
    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut stop = shutdown.subscribe();

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    tracing::info!("SIGHUP received, graceful restart");
                    if events.send(LifecycleEvent::Restart(RestartReason::Signal)).is_err() {
                        break;
                    }
                }
                _ = terminate.recv() => {
                    tracing::info!("SIGTERM received, shutting down");
                    shutdown.trigger();
                    break;
                }
                _ = interrupt.recv() => {
                    tracing::info!("SIGINT received, shutting down");
                    shutdown.trigger();
                    break;
                }
                _ = stop.recv() => break,
            }
        }
    }))
}
