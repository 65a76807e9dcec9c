//! Work queue implementation

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use eyre::{Result, eyre};
use futures::FutureExt;
use tokio::sync::{Mutex, Notify, mpsc, oneshot};
use tracing::debug;

use super::config::WorkQueueConfig;
use super::handle::{CompletionHandle, Notification};
use super::item::{QueueState, QueueStats, WorkItem};

/// Internal state protected by mutex
struct QueueInner {
    /// Work items waiting for a slot, admission order
    pending: VecDeque<WorkItem>,

    /// Count of work items currently executing
    executing: usize,

    /// Statistics
    stats: QueueStats,
}

/// State shared between queue clones and spawned work tasks
struct Shared {
    config: WorkQueueConfig,
    inner: Mutex<QueueInner>,
    idle: Notify,
}

/// The WorkQueue admits asynchronous work items under a fixed concurrency
/// cap and hands callers a completion handle per item.
///
/// Waiting items are admitted strictly first-in-first-out; [`enqueue_now`]
/// bypasses admission for urgent work. Every completion, successful or
/// not, frees its slot and drains the pending list. Cloning the queue
/// shares the instance; separate [`new`] calls share nothing.
///
/// There is no cancellation: once submitted, an item runs to settlement.
///
/// [`enqueue_now`]: WorkQueue::enqueue_now
/// [`new`]: WorkQueue::new
#[derive(Clone)]
pub struct WorkQueue {
    shared: Arc<Shared>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new(WorkQueueConfig::default())
    }
}

impl WorkQueue {
    /// Create a new work queue with the given configuration
    pub fn new(config: WorkQueueConfig) -> Self {
        debug!(?config, "WorkQueue::new: called");
        Self {
            shared: Arc::new(Shared {
                config,
                inner: Mutex::new(QueueInner {
                    pending: VecDeque::new(),
                    executing: 0,
                    stats: QueueStats::default(),
                }),
                idle: Notify::new(),
            }),
        }
    }

    /// Submit a work factory; the item waits for a free slot in admission
    /// order.
    ///
    /// Returns the completion handle immediately. The factory is invoked
    /// at most once, exactly when the item is admitted to execute.
    pub async fn enqueue<F, Fut, T>(&self, work: F) -> CompletionHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(work, false).await
    }

    /// Submit a work factory that starts immediately, ignoring the
    /// concurrency cap.
    ///
    /// The escape hatch for urgent work: `executing` may transiently
    /// exceed `max_parallel` while a bypassed item runs.
    pub async fn enqueue_now<F, Fut, T>(&self, work: F) -> CompletionHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(work, true).await
    }

    async fn submit<F, Fut, T>(&self, work: F, run_now: bool) -> CompletionHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let handle = CompletionHandle::new(result_rx, progress_rx);

        // Type-erase the factory so one queue holds heterogeneous work.
        // The wrapper settles the handle itself and reports success, so
        // the queue never sees the caller's value or error types.
        let job = Box::new(move || {
            async move {
                let outcome = AssertUnwindSafe(async move { work().await }).catch_unwind().await;
                let result = match outcome {
                    Ok(result) => result,
                    Err(panic) => Err(eyre!("work item panicked: {}", panic_message(&panic))),
                };
                let succeeded = result.is_ok();
                // The caller may have dropped its handle; settlement is
                // best-effort.
                let _ = result_tx.send(result);
                succeeded
            }
            .boxed()
        });
        let item = WorkItem { job, progress_tx };

        if run_now {
            let mut inner = self.shared.inner.lock().await;
            inner.stats.total_enqueued += 1;
            inner.executing += 1;
            inner.stats.peak_concurrent = inner.stats.peak_concurrent.max(inner.executing);
            debug!(executing = inner.executing, "bypassing queue, starting immediately");
            drop(inner);
            self.spawn_item(item);
        } else {
            let mut inner = self.shared.inner.lock().await;
            inner.stats.total_enqueued += 1;
            inner.pending.push_back(item);
            inner.stats.peak_queue_depth = inner.stats.peak_queue_depth.max(inner.pending.len());
            drop(inner);
            self.admit_pending().await;
        }

        handle
    }

    /// Drain the pending list while capacity allows.
    ///
    /// Safe to call redundantly: a no-op when nothing is pending or no
    /// slot is free.
    async fn admit_pending(&self) {
        let ready = {
            let mut inner = self.shared.inner.lock().await;
            debug!(
                executing = inner.executing,
                waiting = inner.pending.len(),
                "draining work queue"
            );
            let mut ready = Vec::new();
            while inner.executing < self.shared.config.max_parallel {
                let Some(item) = inner.pending.pop_front() else { break };
                inner.executing += 1;
                inner.stats.peak_concurrent = inner.stats.peak_concurrent.max(inner.executing);
                ready.push(item);
            }
            ready
        };

        // Spawn outside the lock
        for item in ready {
            self.spawn_item(item);
        }
    }

    /// Start an admitted item on its own task
    fn spawn_item(&self, item: WorkItem) {
        let queue = self.clone();
        tokio::spawn(async move {
            let WorkItem { job, progress_tx } = item;
            debug!("work start");
            // Delivered from the spawned task, never synchronously inside
            // enqueue or the admission loop; the channel buffers it for
            // subscribers that attach after enqueue returns.
            let _ = progress_tx.send(Notification::Started);
            let succeeded = job().await;
            queue.finish_item(succeeded).await;
        });
    }

    /// Free the completed item's slot and drain again
    async fn finish_item(&self, succeeded: bool) {
        {
            let mut inner = self.shared.inner.lock().await;
            inner.executing -= 1;
            if succeeded {
                inner.stats.total_completed += 1;
            } else {
                inner.stats.total_failed += 1;
            }
            debug!(executing = inner.executing, succeeded, "work item finished");
        }

        self.admit_pending().await;
        self.shared.idle.notify_waiters();
    }

    /// True when the queue has anything running or waiting
    pub async fn can_show_status(&self) -> bool {
        let inner = self.shared.inner.lock().await;
        inner.executing > 0 || !inner.pending.is_empty()
    }

    /// Human-readable load summary.
    ///
    /// The format is a display contract: `"Loading: <executing>"`, with
    /// `", queued: <pending>"` appended only when items are waiting.
    pub async fn status_message(&self) -> String {
        let inner = self.shared.inner.lock().await;
        let mut msg = format!("Loading: {}", inner.executing);
        if !inner.pending.is_empty() {
            msg.push_str(&format!(", queued: {}", inner.pending.len()));
        }
        msg
    }

    /// Get current queue state for display
    pub async fn queue_state(&self) -> QueueState {
        let inner = self.shared.inner.lock().await;
        QueueState {
            executing: inner.executing,
            pending: inner.pending.len(),
            stats: inner.stats.clone(),
        }
    }

    /// Get the queue statistics
    pub async fn stats(&self) -> QueueStats {
        let inner = self.shared.inner.lock().await;
        inner.stats.clone()
    }

    /// Wait until nothing is executing and nothing is pending
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            {
                let inner = self.shared.inner.lock().await;
                if inner.executing == 0 && inner.pending.is_empty() {
                    return;
                }
            }
            notified.await;
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
