use std::time::Duration;

use statsprism_core::MetricsClient;

/// Emits each metric as a `tracing` event under the `statsprism::metrics`
/// target. Handy in development when no statsd agent is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricsClient for LogSink {
    fn send_count(&self, name: &str, delta: i64) {
        tracing::info!(target: "statsprism::metrics", metric = name, delta, "count");
    }

    fn send_timing(&self, name: &str, duration: Duration) {
        tracing::info!(
            target: "statsprism::metrics",
            metric = name,
            ms = duration.as_secs_f64() * 1000.0,
            "timing"
        );
    }
}
