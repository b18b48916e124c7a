//! Shutdown coordination for the service.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// The HTTP server subscribes before it starts serving; the signal task
/// triggers once on SIGINT/SIGTERM.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every subscriber. Harmless when nobody listens anymore.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` receives the shutdown signal or its sender is gone.
pub async fn wait_for(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
    tracing::info!("Shutdown signal received");
}
