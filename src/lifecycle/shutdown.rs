//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;

/// Fan-out trigger for graceful shutdown.
///
/// The server holds a receiver; anything holding a clone of this can stop it.
/// Dropping every `Shutdown` also stops the server.
#[derive(Debug, Clone)]
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

    pub fn trigger(&self) {
        let receivers = self.tx.send(()).unwrap_or(0);
        tracing::debug!(receivers, "Shutdown triggered");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
