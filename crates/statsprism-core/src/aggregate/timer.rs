use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::client::Prefixed;
use crate::error::{Result, StatsError};

/// Accumulates named durations for one timing session.
///
/// Starts are kept per key as a LIFO stack, so the same key may be started
/// again before it is stopped (reentrant code paths). Every stop adds its
/// elapsed time to the key's running total.
pub struct Timer {
    client: Prefixed,
    strict: bool,
    starts: HashMap<String, Vec<Instant>>,
    accumulated: HashMap<String, Duration>,
}

impl Timer {
    pub(crate) fn new(client: Prefixed, strict: bool) -> Self {
        Self {
            client,
            strict,
            starts: HashMap::new(),
            accumulated: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        self.client.prefix()
    }

    pub fn start(&mut self, key: &str) {
        self.starts.entry(key.to_string()).or_default().push(Instant::now());
    }

    /// Stop the most recent start of `key` and return its elapsed time.
    pub fn stop(&mut self, key: &str) -> Result<Duration> {
        let started = self
            .starts
            .get_mut(key)
            .and_then(|stack| stack.pop())
            .ok_or_else(|| StatsError::TimerNotStarted { key: key.to_string() })?;

        let elapsed = started.elapsed();
        if self.starts.get(key).is_some_and(|stack| stack.is_empty()) {
            self.starts.remove(key);
        }

        *self.accumulated.entry(key.to_string()).or_default() += elapsed;
        Ok(elapsed)
    }

    /// Accumulated time for `key` (stopped intervals only).
    pub fn elapsed(&self, key: &str) -> Option<Duration> {
        self.accumulated.get(key).copied()
    }

    /// Keys with at least one start that was never stopped.
    pub fn pending(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.starts.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.starts.contains_key(key)
    }

    /// Send every accumulated key under `prefix.parts.key` and drain.
    ///
    /// In strict mode, unstopped starts are reported as an error after the
    /// accumulated samples have been sent.
    pub fn submit<S: AsRef<str>>(&mut self, parts: &[S]) -> Result<()> {
        let client = self.client.child(parts);
        for (key, total) in self.accumulated.drain() {
            client.timing(&key, total);
        }

        if self.strict && !self.starts.is_empty() {
            return Err(StatsError::UnstoppedTimers { keys: self.pending() });
        }
        Ok(())
    }

    /// Start `key` now and stop it when the returned guard drops.
    pub fn time(&mut self, key: &str) -> TimerGuard<'_> {
        self.start(key);
        TimerGuard {
            timer: self,
            key: key.to_string(),
        }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("prefix", &self.prefix())
            .field("pending", &self.pending())
            .field("accumulated", &self.accumulated)
            .finish()
    }
}

/// Stops its key on drop, including during unwinding.
pub struct TimerGuard<'a> {
    timer: &'a mut Timer,
    key: String,
}

impl TimerGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.timer.stop(&self.key) {
            tracing::error!(error = %e, "timer guard stop failed");
        }
    }
}
