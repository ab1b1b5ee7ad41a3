use std::sync::Arc;

use statsprism_core::naming;
use statsprism_core::Metrics;

use crate::correlation::CorrelationStore;
use crate::scope;
use crate::signals::{Event, Receiver, TaskBody};

/// Task-queue bridging: queue time across publish/execute, plus the
/// execution scope itself.
pub struct TaskHooks {
    metrics: Metrics,
    correlation: Arc<CorrelationStore>,
    label: String,
    default_queue: String,
}

impl TaskHooks {
    pub fn new(
        metrics: Metrics,
        correlation: Arc<CorrelationStore>,
        label: String,
        default_queue: String,
    ) -> Self {
        Self {
            metrics,
            correlation,
            label,
            default_queue,
        }
    }

    fn name_for(&self, task: &str, routing_key: Option<&str>) -> String {
        naming::task_queue_name(task, routing_key, &self.default_queue)
    }

    fn on_publish(&self, body: &TaskBody) {
        let name = self.name_for(&body.task, body.routing_key.as_deref());
        self.metrics.event_counter(&self.label, "sent", &[&name], 1);

        let timer = self.metrics.event_timer(&self.label, "queue_time");
        self.correlation.put(&body.id, timer);
        tracing::debug!(task_id = %body.id, task = %name, "queue timer stored");
    }

    fn on_prerun(&self, task: &str, task_id: &str, routing_key: Option<&str>) {
        let name = self.name_for(task, routing_key);
        match self.correlation.take(task_id) {
            None => {
                tracing::debug!(task_id, task = %name, "no queue timer, counting queue_timeout");
                self.metrics.event_counter(&self.label, "queue_timeout", &[&name], 1);
            }
            Some(mut timer) => {
                if let Err(e) = timer.stop("queue_time") {
                    tracing::error!(error = %e, task_id, "correlated timer was not running");
                }
                if let Err(e) = timer.submit(&[&name]) {
                    tracing::error!(error = %e, task_id, "queue timer submit reported misuse");
                }
            }
        }
        scope::begin(&self.metrics, &self.label, &[&name]);
    }

    fn on_postrun(&self, task: &str, routing_key: Option<&str>) {
        scope::finish(&[self.name_for(task, routing_key)]);
    }

    fn on_failure(&self, task: &str, routing_key: Option<&str>) {
        let name = match routing_key {
            Some(_) => self.name_for(task, routing_key),
            None => task.to_string(),
        };
        scope::fail(&[name]);
    }
}

impl Receiver for TaskHooks {
    fn name(&self) -> &'static str {
        "statsd_tasks"
    }

    fn receive(&self, event: &Event<'_>) {
        match *event {
            Event::TaskPublished { body } => self.on_publish(body),
            Event::TaskPrerun {
                task,
                task_id,
                routing_key,
            } => self.on_prerun(task, task_id, routing_key),
            Event::TaskPostrun { task, routing_key } => self.on_postrun(task, routing_key),
            Event::TaskFailure { task, routing_key } => self.on_failure(task, routing_key),
            _ => {}
        }
    }
}
