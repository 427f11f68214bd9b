//! Shutdown coordination for the proxy and backend servers.
//!
//! Each binary owns one [`Shutdown`]. The server's `run` loop holds a
//! receiver and drains in-flight requests once the signal handler, or a
//! test harness dropping its handle, fires the trigger.

use tokio::sync::broadcast;

/// Broadcast handle that tells running servers to stop accepting traffic.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to pass to `HttpServer::run` or `BackendServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to stop; returns how many were told.
    ///
    /// Firing with no live server is not an error: the process may be
    /// exiting before anything was bound.
    pub fn trigger(&self) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(servers = notified, "Shutdown triggered");
        notified
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut proxy = shutdown.subscribe();
        let mut backend = shutdown.clone().subscribe();

        assert_eq!(shutdown.trigger(), 2);
        assert!(proxy.recv().await.is_ok());
        assert!(backend.recv().await.is_ok());
    }

    #[test]
    fn trigger_without_servers_is_harmless() {
        let shutdown = Shutdown::new();
        assert_eq!(shutdown.trigger(), 0);

        let rx = shutdown.subscribe();
        drop(rx);
        assert_eq!(shutdown.trigger(), 0);
    }
}
