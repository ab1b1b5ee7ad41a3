use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use statsprism_core::error::Result;

/// A unit of background work, registered under a dotted task name.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, payload: Value) -> Result<()>;
}

/// Task name → handler.
#[derive(Default)]
pub struct TaskRegistry {
    handlers: DashMap<&'static str, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(name).map(|h| h.value().clone())
    }

    pub fn registered(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.iter().map(|e| *e.key()).collect();
        names.sort_unstable();
        names
    }
}
