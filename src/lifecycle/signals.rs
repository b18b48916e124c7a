//! OS signal handling.
//!
//! SIGINT and SIGTERM both trigger a graceful shutdown.

use std::sync::Arc;

use crate::lifecycle::shutdown::Shutdown;

/// Wait for SIGINT or SIGTERM.
pub async fn terminate_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Spawn a task that triggers `shutdown` on the first termination signal.
pub fn spawn_signal_handler(shutdown: Arc<Shutdown>) {
    tokio::spawn(async move {
        terminate_signal().await;
        shutdown.trigger();
    });
}
