//! Work queue configuration

use serde::{Deserialize, Serialize};

/// Work queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkQueueConfig {
    /// Max work items executing concurrently
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

fn default_max_parallel() -> usize {
    4
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self { max_parallel: 4 }
    }
}

impl WorkQueueConfig {
    /// Config with an explicit concurrency cap
    pub fn with_max_parallel(max_parallel: usize) -> Self {
        Self { max_parallel }
    }
}
