//! Shutdown coordination.
//!
//! One [`Shutdown`] per process (or per test server). The HTTP server holds a
//! receiver and stops accepting once [`Shutdown::trigger`] fires; SSE streams
//! already running finish on their own tasks.

use tokio::sync::broadcast;

/// Broadcast coordinator for graceful shutdown.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that resolves once `trigger` is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Returns how many were still listening.
    pub fn trigger(&self) -> usize {
        let listeners = self.tx.send(()).unwrap_or(0);
        if listeners > 0 {
            tracing::debug!(listeners, "Shutdown triggered");
        }
        listeners
    }

    /// Subscribers still waiting for the signal.
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
