use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;

use statsprism_core::error::{Result, StatsError};
use statsprism_core::naming;

use crate::signals::{Event, Signals, TaskBody};

/// A published task on its way to a worker.
#[derive(Debug, Clone)]
pub struct TaskMessage {
    pub body: TaskBody,
    pub payload: Value,
}

/// In-process task queue: named bounded channels, one consumer each.
pub struct TaskQueue {
    signals: Arc<Signals>,
    queues: DashMap<String, mpsc::Sender<TaskMessage>>,
    default_queue: String,
}

impl TaskQueue {
    pub fn new(signals: Arc<Signals>, default_queue: impl Into<String>) -> Self {
        Self {
            signals,
            queues: DashMap::new(),
            default_queue: default_queue.into(),
        }
    }

    pub fn default_queue(&self) -> &str {
        &self.default_queue
    }

    /// Create (or replace) queue `name` and hand back its consumer end.
    pub fn declare(&self, name: &str, capacity: usize) -> mpsc::Receiver<TaskMessage> {
        let (tx, rx) = mpsc::channel(capacity);
        if self.queues.insert(name.to_string(), tx).is_some() {
            tracing::warn!(queue = name, "queue redeclared, previous consumer detached");
        }
        rx
    }

    /// Publish `task` and return its id.
    ///
    /// A channel slot is reserved first, so a full or closed queue fails
    /// without emitting anything. The publish signal then fires before the
    /// message is sent, so the queue timer is always stored before a worker
    /// can look it up.
    pub fn publish(
        &self,
        task: &str,
        routing_key: Option<&str>,
        payload: Value,
    ) -> Result<String> {
        let queue = routing_key
            .map(naming::queue_key)
            .filter(|q| !q.is_empty())
            .unwrap_or(self.default_queue.as_str())
            .to_string();
        let tx = self
            .queues
            .get(&queue)
            .map(|q| q.value().clone())
            .ok_or_else(|| StatsError::Internal(format!("no such queue: {queue}")))?;
        let permit = tx
            .try_reserve()
            .map_err(|e| StatsError::Internal(format!("enqueue failed on {queue}: {e}")))?;

        let body = TaskBody {
            id: uuid::Uuid::new_v4().to_string(),
            task: task.to_string(),
            routing_key: routing_key.map(str::to_string),
        };
        self.signals.emit(&Event::TaskPublished { body: &body });

        let id = body.id.clone();
        permit.send(TaskMessage { body, payload });
        tracing::debug!(task_id = %id, task, queue = %queue, "task published");
        Ok(id)
    }
}
