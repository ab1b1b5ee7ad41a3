//! Per-unit-of-work aggregators.
//!
//! [`Counter`] and [`Timer`] buffer events in memory and flush them to a
//! [`MetricsClient`] in one batch. [`Metrics`] is the factory: it owns the
//! client handle, the global prefix and the strict flag, so every aggregator
//! created through it is named consistently.

mod counter;
mod timer;

pub use counter::Counter;
pub use timer::{Timer, TimerGuard};

use std::sync::Arc;

use crate::client::{MetricsClient, Prefixed};

/// Factory for aggregators sharing one client and one global prefix.
#[derive(Clone)]
pub struct Metrics {
    client: Arc<dyn MetricsClient>,
    global_prefix: Option<String>,
    strict: bool,
}

impl Metrics {
    pub fn new(client: Arc<dyn MetricsClient>) -> Self {
        Self {
            client,
            global_prefix: None,
            strict: false,
        }
    }

    /// Prepend `prefix` to every aggregator prefix (`"{prefix}.{local}"`).
    pub fn with_global_prefix(mut self, prefix: Option<String>) -> Self {
        self.global_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    /// Report unstopped timer starts at submit time.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn client(&self) -> Arc<dyn MetricsClient> {
        Arc::clone(&self.client)
    }

    /// Client handle for `prefix` with the global prefix applied.
    pub fn prefixed(&self, prefix: &str) -> Prefixed {
        let full = match &self.global_prefix {
            Some(g) => crate::naming::join(g, &[prefix]),
            None => prefix.to_string(),
        };
        Prefixed::new(Arc::clone(&self.client), full)
    }

    pub fn counter(&self, prefix: &str) -> Counter {
        Counter::new(self.prefixed(prefix))
    }

    pub fn timer(&self, prefix: &str) -> Timer {
        Timer::new(self.prefixed(prefix), self.strict)
    }

    /// One-shot counter: `prefix.target….event += delta`, sent immediately.
    pub fn event_counter<S: AsRef<str>>(
        &self,
        prefix: &str,
        event: &str,
        target: &[S],
        delta: i64,
    ) {
        let mut counter = self.counter(prefix);
        counter.increment(event, delta);
        counter.submit(target);
    }

    /// Timer with `event` already started, for sessions that outlive the
    /// caller (e.g. queue time between publish and execution).
    pub fn event_timer(&self, prefix: &str, event: &str) -> Timer {
        let mut timer = self.timer(prefix);
        timer.start(event);
        timer
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("global_prefix", &self.global_prefix)
            .field("strict", &self.strict)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RecordingClient;

    fn metrics() -> (Arc<RecordingClient>, Metrics) {
        let rec = Arc::new(RecordingClient::new());
        let m = Metrics::new(rec.clone()).with_global_prefix(Some("prefix".into()));
        (rec, m)
    }

    #[test]
    fn global_prefix_is_prepended() {
        let (rec, m) = metrics();
        let mut c = m.counter("view");
        c.incr("hit");
        c.submit::<&str>(&[]);
        assert_eq!(rec.count("prefix.view.hit"), 1);
    }

    #[test]
    fn event_counter_submits_under_target() {
        let (rec, m) = metrics();
        m.event_counter("celery", "sent", &["tasks.debug.queue_celery"], 1);
        assert_eq!(rec.count("prefix.celery.tasks.debug.queue_celery.sent"), 1);
    }

    #[test]
    fn event_timer_is_running() {
        let (_rec, m) = metrics();
        let t = m.event_timer("celery", "queue_time");
        assert!(t.is_running("queue_time"));
    }
}
