//! CompletionHandle - caller-facing settlement and progress interface

use eyre::{Result, eyre};
use tokio::sync::{mpsc, oneshot};

/// Progress notification delivered on a work item's progress channel.
///
/// `Started` is the only lifecycle event surfaced between enqueue and
/// settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The item was admitted and its work factory invoked
    Started,
}

/// Handle through which a work item's eventual outcome is observed.
///
/// Created unsettled at enqueue time, settled exactly once when the
/// underlying work resolves or rejects. Progress events arrive on a
/// separate multi-fire channel, so settlement and lifecycle observation
/// stay independent. Notifications are buffered: subscribing any time
/// after enqueue returns still observes every event.
pub struct CompletionHandle<T> {
    result_rx: oneshot::Receiver<Result<T>>,
    progress_rx: mpsc::UnboundedReceiver<Notification>,
}

impl<T> CompletionHandle<T> {
    pub(crate) fn new(
        result_rx: oneshot::Receiver<Result<T>>,
        progress_rx: mpsc::UnboundedReceiver<Notification>,
    ) -> Self {
        Self {
            result_rx,
            progress_rx,
        }
    }

    /// Wait for the work item to settle.
    ///
    /// Resolves with the factory's value or relays its error verbatim. An
    /// item dropped by the queue before settling surfaces as an error.
    pub async fn wait(self) -> Result<T> {
        self.result_rx
            .await
            .map_err(|_| eyre!("work item dropped before settling"))?
    }

    /// Receive the next progress notification.
    ///
    /// Returns None once the item has settled and all buffered
    /// notifications were consumed.
    pub async fn progress(&mut self) -> Option<Notification> {
        self.progress_rx.recv().await
    }

    /// Try to receive a progress notification without blocking
    pub fn try_progress(&mut self) -> Option<Notification> {
        self.progress_rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_relays_value() {
        let (result_tx, result_rx) = oneshot::channel();
        let (_progress_tx, progress_rx) = mpsc::unbounded_channel();
        let handle = CompletionHandle::new(result_rx, progress_rx);

        result_tx.send(Ok(42)).ok();

        assert_eq!(handle.wait().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_wait_maps_dropped_sender() {
        let (result_tx, result_rx) = oneshot::channel::<Result<()>>();
        let (_progress_tx, progress_rx) = mpsc::unbounded_channel();
        let handle = CompletionHandle::new(result_rx, progress_rx);

        drop(result_tx);

        assert!(handle.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_progress_is_buffered() {
        let (_result_tx, result_rx) = oneshot::channel::<Result<()>>();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let mut handle = CompletionHandle::new(result_rx, progress_rx);

        progress_tx.send(Notification::Started).ok();

        assert_eq!(handle.progress().await, Some(Notification::Started));
        assert_eq!(handle.try_progress(), None);
    }
}
