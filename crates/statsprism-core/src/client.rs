//! Metrics client capability.
//!
//! The core never talks to the network itself. Everything it flushes goes
//! through a [`MetricsClient`]; concrete sinks (UDP statsd, log, no-op) live
//! in the gateway crate. [`RecordingClient`] keeps samples in memory and is
//! what tests assert against.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::naming;

/// Sink for fully-qualified metric names.
///
/// Implementations must be best-effort: a failed send is their own concern
/// and must never surface to the unit of work being measured.
pub trait MetricsClient: Send + Sync {
    /// Counter semantics: the backend sums deltas.
    fn send_count(&self, name: &str, delta: i64);
    /// Timer semantics: one duration sample.
    fn send_timing(&self, name: &str, duration: Duration);
}

/// A client handle bound to a composed prefix.
#[derive(Clone)]
pub struct Prefixed {
    client: Arc<dyn MetricsClient>,
    prefix: String,
}

impl Prefixed {
    pub fn new(client: Arc<dyn MetricsClient>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derive a handle for `prefix.parts…` (empty parts skipped).
    pub fn child<S: AsRef<str>>(&self, parts: &[S]) -> Prefixed {
        Prefixed {
            client: Arc::clone(&self.client),
            prefix: naming::join(&self.prefix, parts),
        }
    }

    fn full(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    pub fn count(&self, key: &str, delta: i64) {
        self.client.send_count(&self.full(key), delta);
    }

    pub fn timing(&self, key: &str, duration: Duration) {
        self.client.send_timing(&self.full(key), duration);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClient;

impl MetricsClient for NoopClient {
    fn send_count(&self, _name: &str, _delta: i64) {}
    fn send_timing(&self, _name: &str, _duration: Duration) {}
}

/// Value carried by a recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Count(i64),
    Timing(Duration),
}

/// One call made against a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub value: SampleValue,
}

/// In-memory client that records every send, in order.
#[derive(Debug, Default)]
pub struct RecordingClient {
    samples: Mutex<Vec<Sample>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sample>> {
        match self.samples.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("recording client mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn push(&self, name: &str, value: SampleValue) {
        self.lock().push(Sample {
            name: name.to_string(),
            value,
        });
    }

    /// Snapshot of all samples recorded so far.
    pub fn samples(&self) -> Vec<Sample> {
        self.lock().clone()
    }

    /// Drain recorded samples.
    pub fn take(&self) -> Vec<Sample> {
        std::mem::take(&mut *self.lock())
    }

    /// Distinct metric names recorded so far.
    pub fn names(&self) -> BTreeSet<String> {
        self.lock().iter().map(|s| s.name.clone()).collect()
    }

    /// Sum of all count deltas sent under `name`.
    pub fn count(&self, name: &str) -> i64 {
        self.lock()
            .iter()
            .filter(|s| s.name == name)
            .map(|s| match s.value {
                SampleValue::Count(d) => d,
                SampleValue::Timing(_) => 0,
            })
            .sum()
    }

    /// All timing samples sent under `name`.
    pub fn timings(&self, name: &str) -> Vec<Duration> {
        self.lock()
            .iter()
            .filter(|s| s.name == name)
            .filter_map(|s| match s.value {
                SampleValue::Timing(d) => Some(d),
                SampleValue::Count(_) => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl MetricsClient for RecordingClient {
    fn send_count(&self, name: &str, delta: i64) {
        self.push(name, SampleValue::Count(delta));
    }

    fn send_timing(&self, name: &str, duration: Duration) {
        self.push(name, SampleValue::Timing(duration));
    }
}
