use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::mpsc;

use crate::scope;
use crate::signals::{Event, Signals};

use super::{TaskMessage, TaskRegistry};

/// How a single task execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed(String),
    Unknown,
}

/// Consumes one queue, executing each task in its own metrics scope.
pub struct Worker {
    registry: Arc<TaskRegistry>,
    signals: Arc<Signals>,
}

impl Worker {
    pub fn new(registry: Arc<TaskRegistry>, signals: Arc<Signals>) -> Self {
        Self { registry, signals }
    }

    /// Run until every sender of `rx` is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<TaskMessage>) {
        while let Some(msg) = rx.recv().await {
            let outcome = self.execute(msg).await;
            tracing::trace!(?outcome, "task finished");
        }
        tracing::info!("task queue closed, worker exiting");
    }

    /// Execute one task with prerun/postrun/failure signals around it.
    pub async fn execute(&self, msg: TaskMessage) -> TaskOutcome {
        scope::instrument(self.execute_scoped(msg)).await
    }

    async fn execute_scoped(&self, msg: TaskMessage) -> TaskOutcome {
        let TaskMessage { body, payload } = msg;
        let task = body.task.as_str();
        let routing_key = body.routing_key.as_deref();

        self.signals.emit(&Event::TaskPrerun {
            task,
            task_id: &body.id,
            routing_key,
        });

        let outcome = match self.registry.get(task) {
            None => {
                tracing::warn!(task, task_id = %body.id, "unregistered task");
                TaskOutcome::Unknown
            }
            Some(handler) => match AssertUnwindSafe(handler.run(payload)).catch_unwind().await {
                Ok(Ok(())) => TaskOutcome::Succeeded,
                Ok(Err(e)) => {
                    tracing::warn!(task, task_id = %body.id, error = %e, "task failed");
                    TaskOutcome::Failed(e.to_string())
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(task, task_id = %body.id, panic = %message, "task panicked");
                    TaskOutcome::Failed(format!("panicked: {message}"))
                }
            },
        };

        if outcome != TaskOutcome::Succeeded {
            self.signals.emit(&Event::TaskFailure { task, routing_key });
        }
        // postrun fires after failure too; the scope is already flushed then
        self.signals.emit(&Event::TaskPostrun { task, routing_key });
        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
