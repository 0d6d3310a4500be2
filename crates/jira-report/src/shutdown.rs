//! Termination signals that cancel a run.

use std::future::{pending, Future};
use std::io;

use tokio::signal;
use tracing::warn;

/// Resolve with `name` once `installed` reports the signal.
///
/// A handler that fails to install is logged and never resolves, so it
/// cannot be mistaken for a delivered signal.
pub async fn on_signal<F>(name: &'static str, installed: F) -> &'static str
where
    F: Future<Output = io::Result<()>>,
{
    match installed.await {
        Ok(()) => name,
        Err(e) => {
            warn!(signal = name, error = %e, "Failed to install signal handler");
            pending().await
        }
    }
}

/// Wait for Ctrl-C or SIGTERM and return the signal's name.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = on_signal("SIGINT", signal::ctrl_c());

    #[cfg(unix)]
    let terminate = on_signal("SIGTERM", async {
        let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        match stream.recv().await {
            Some(()) => Ok::<(), io::Error>(()),
            None => pending().await,
        }
    });

    #[cfg(not(unix))]
    let terminate = pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}
