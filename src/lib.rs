//! WorkQueue - bounded concurrent work queue
//!
//! WorkQueue schedules asynchronous work items under a fixed concurrency
//! cap. Callers submit zero-argument work factories and get back a
//! completion handle that settles with the work's own result; a separate
//! progress channel signals when an item actually starts. Pending items
//! are admitted strictly first-in-first-out, and every completion drains
//! the queue so waiting work starts as soon as capacity frees up.
//!
//! # Core Concepts
//!
//! - **Bounded admission**: at most `max_parallel` items execute at once
//! - **FIFO fairness**: waiting items start in submission order
//! - **Bypass for urgent work**: `enqueue_now` skips the cap entirely
//! - **Transparent relay**: results and errors pass through verbatim; a
//!   failing item frees its slot exactly like a successful one
//!
//! # Modules
//!
//! - [`queue`] - Queue implementation, configuration, and completion handles

pub mod queue;

// Re-export commonly used types
pub use queue::{CompletionHandle, Notification, QueueState, QueueStats, WorkQueue, WorkQueueConfig};
