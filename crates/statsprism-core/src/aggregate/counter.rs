use std::collections::HashMap;

use crate::client::Prefixed;

/// Accumulates counter deltas for one unit of work.
///
/// Nothing is sent until [`Counter::submit`]; submit drains, so a second
/// submit without new increments sends nothing.
pub struct Counter {
    client: Prefixed,
    deltas: HashMap<String, i64>,
}

impl Counter {
    pub(crate) fn new(client: Prefixed) -> Self {
        Self {
            client,
            deltas: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        self.client.prefix()
    }

    pub fn increment(&mut self, key: &str, delta: i64) {
        *self.deltas.entry(key.to_string()).or_insert(0) += delta;
    }

    pub fn decrement(&mut self, key: &str, delta: i64) {
        *self.deltas.entry(key.to_string()).or_insert(0) -= delta;
    }

    pub fn incr(&mut self, key: &str) {
        self.increment(key, 1);
    }

    pub fn decr(&mut self, key: &str) {
        self.decrement(key, 1);
    }

    /// Current accumulated delta (0 for unknown keys).
    pub fn get(&self, key: &str) -> i64 {
        self.deltas.get(key).copied().unwrap_or(0)
    }

    /// Send every non-zero delta under `prefix.parts.key`, then clear.
    pub fn submit<S: AsRef<str>>(&mut self, parts: &[S]) {
        let client = self.client.child(parts);
        for (key, delta) in self.deltas.drain() {
            if delta != 0 {
                client.count(&key, delta);
            }
        }
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("prefix", &self.prefix())
            .field("deltas", &self.deltas)
            .finish()
    }
}
