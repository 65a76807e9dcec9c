//! Work item and queue snapshot types

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use super::handle::Notification;

/// A unit of work waiting in or admitted to the queue.
///
/// `job` is the type-erased wrapper around the caller's work factory: when
/// invoked and awaited it runs the work, settles the item's completion
/// handle, and reports whether the work succeeded. Invoked at most once,
/// exactly when the item is admitted.
pub(crate) struct WorkItem {
    pub(crate) job: Box<dyn FnOnce() -> BoxFuture<'static, bool> + Send>,
    pub(crate) progress_tx: mpsc::UnboundedSender<Notification>,
}

/// Statistics for the queue
#[derive(Debug, Default, Clone)]
pub struct QueueStats {
    pub total_enqueued: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub peak_concurrent: usize,
    pub peak_queue_depth: usize,
}

/// Queue state snapshot for display
#[derive(Debug, Clone)]
pub struct QueueState {
    pub executing: usize,
    pub pending: usize,
    pub stats: QueueStats,
}
