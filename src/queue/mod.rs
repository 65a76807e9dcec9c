//! Bounded work queue
//!
//! The queue admits work under a fixed concurrency cap via three pieces:
//! - **WorkQueue:** admission, draining, and status introspection
//! - **CompletionHandle:** settle-once result plus progress notifications
//! - **WorkQueueConfig:** constructor-supplied limits

mod config;
mod core;
mod handle;
mod item;

pub use config::WorkQueueConfig;
pub use core::WorkQueue;
pub use handle::{CompletionHandle, Notification};
pub use item::{QueueState, QueueStats};
