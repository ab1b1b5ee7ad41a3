//! Shared application state for the statsprism gateway.
//!
//! Builds the metrics sink, the signal registry with all hooks connected,
//! the correlation store and the task queue. Startup errors are returned,
//! never panicked on.

use std::sync::Arc;

use tokio::task::JoinHandle;

use statsprism_core::error::Result;
use statsprism_core::{Metrics, MetricsClient};

use crate::config::StatsprismConfig;
use crate::correlation::CorrelationStore;
use crate::hooks::{self, HookSettings};
use crate::signals::Signals;
use crate::sink;
use crate::tasks::{DebugTask, FailTask, TaskQueue, TaskRegistry, Worker};

const QUEUE_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: StatsprismConfig,
    metrics: Metrics,
    signals: Arc<Signals>,
    correlation: Arc<CorrelationStore>,
    registry: Arc<TaskRegistry>,
    queue: Arc<TaskQueue>,
}

impl AppState {
    /// Build application state with the sink named in the config.
    pub fn new(cfg: StatsprismConfig) -> Result<Self> {
        let client = sink::build(&cfg.statsd)?;
        Ok(Self::with_client(cfg, client))
    }

    /// Build application state around an explicit metrics client.
    pub fn with_client(cfg: StatsprismConfig, client: Arc<dyn MetricsClient>) -> Self {
        let metrics = Metrics::new(client)
            .with_global_prefix(cfg.statsd.prefix.clone())
            .with_strict(cfg.statsd.debug);

        let signals = Arc::new(Signals::new());
        let correlation = Arc::new(CorrelationStore::in_memory(cfg.tasks.correlation_ttl()));
        hooks::install(
            &signals,
            &metrics,
            Arc::clone(&correlation),
            &HookSettings::from_config(&cfg),
        );

        let registry = Arc::new(TaskRegistry::new());
        registry.register(Arc::new(DebugTask));
        registry.register(Arc::new(FailTask));

        let queue = Arc::new(TaskQueue::new(Arc::clone(&signals), cfg.tasks.default_queue.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics,
                signals,
                correlation,
                registry,
                queue,
            }),
        }
    }

    /// Declare the default queue, spawn its worker and the correlation sweep.
    pub fn spawn_background(&self) -> Vec<JoinHandle<()>> {
        let rx = self.inner.queue.declare(self.inner.queue.default_queue(), QUEUE_CAPACITY);
        let worker = Worker::new(self.registry(), self.signals());
        let worker = tokio::spawn(worker.run(rx));

        let correlation = Arc::clone(&self.inner.correlation);
        let every = self.inner.cfg.tasks.sweep_interval();
        let sweep = tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let purged = correlation.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "expired queue timers dropped");
                }
            }
        });

        vec![worker, sweep]
    }

    pub fn cfg(&self) -> &StatsprismConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    pub fn signals(&self) -> Arc<Signals> {
        Arc::clone(&self.inner.signals)
    }

    pub fn correlation(&self) -> Arc<CorrelationStore> {
        Arc::clone(&self.inner.correlation)
    }

    pub fn registry(&self) -> Arc<TaskRegistry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn queue(&self) -> Arc<TaskQueue> {
        Arc::clone(&self.inner.queue)
    }
}
