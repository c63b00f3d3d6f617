//! Shutdown coordination for long waits.

use std::future::Future;

use tokio::sync::broadcast;

/// Coordinator for cancelling in-flight waits.
///
/// Clones share one broadcast channel, so a trigger on any clone reaches every
/// subscriber.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Drive `fut` to completion unless shutdown fires first.
    ///
    /// Returns `None` when interrupted; `fut` is dropped at its current await.
    pub async fn cancellable<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut rx = self.subscribe();
        tokio::select! {
            output = fut => Some(output),
            _ = rx.recv() => None,
        }
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
    async fn test_trigger_reaches_clones() {
        let shutdown = Shutdown::new();
        let clone = shutdown.clone();
        let mut rx = shutdown.subscribe();

        clone.trigger();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_cancellable_completes() {
        let shutdown = Shutdown::new();
        assert_eq!(shutdown.cancellable(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_cancellable_interrupts_pending_work() {
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.trigger();
        });

        // Stands in for a receipt wait that never resolves.
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            shutdown.cancellable(std::future::pending::<()>()),
        )
        .await
        .expect("shutdown should end the wait");
        assert_eq!(result, None);
    }

    #[test]
    fn test_trigger_without_subscribers() {
        // Nothing listening is not an error.
        Shutdown::default().trigger();
    }
}
