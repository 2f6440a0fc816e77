//! Post-startup event loop.

use tokio::sync::{broadcast, mpsc};

use crate::lifecycle::signals::LifecycleEvent;
use crate::lifecycle::startup::Server;
use crate::sockopts::SocketOptionSetter;

/// Handle lifecycle events until `shutdown` fires or every sender is gone,
/// then hand the server back for teardown.
///
/// Queued restarts are handled before a pending shutdown. A restart that
/// fails keeps the running configuration.
pub async fn supervise<S: SocketOptionSetter>(
    mut server: Server<S>,
    mut events: mpsc::UnboundedReceiver<LifecycleEvent>,
    mut shutdown: broadcast::Receiver<()>,
) -> Server<S> {
    tracing::info!(
        listeners = server.listeners().len(),
        "Server initialized, waiting for lifecycle events"
    );

    loop {
        let event = tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = shutdown.recv() => {
                tracing::info!("Shutdown requested");
                break;
            }
        };

        match event {
            LifecycleEvent::Restart(reason) => match server.restart() {
                Ok(report) => {
                    if !report.is_clean() {
                        tracing::warn!(
                            ?reason,
                            failed = report.failed.len(),
                            "Restart applied with socket option failures"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(
                        ?reason,
                        error = %e,
                        "Restart failed, keeping current configuration"
                    );
                }
            },
        }
    }

    tracing::info!(generation = server.generation(), "Stopping");
    server
}
