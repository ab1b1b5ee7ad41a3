//! Publish → execute correlation.
//!
//! The publishing side and the executing side of a task never share a
//! scope, so the queue-time timer travels through an expiring cache keyed
//! by task id. A miss on the executing side (expired, or never published
//! through us) is an expected outcome, reported as `queue_timeout`.

mod cache;

pub use cache::{Cache, MemoryCache};

use std::sync::Arc;
use std::time::Duration;

use statsprism_core::Timer;

pub struct CorrelationStore {
    cache: Arc<dyn Cache<Timer>>,
    ttl: Duration,
}

impl CorrelationStore {
    pub fn new(cache: Arc<dyn Cache<Timer>>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// In-process store with the given TTL.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCache::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn put(&self, task_id: &str, timer: Timer) {
        self.cache.set(task_id, timer, self.ttl);
    }

    pub fn take(&self, task_id: &str) -> Option<Timer> {
        self.cache.take(task_id)
    }

    pub fn pending(&self) -> usize {
        self.cache.len()
    }

    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
