//! Unit-of-work-local metrics scope.
//!
//! Each HTTP request or task execution owns exactly one [`Scope`]. Inside a
//! future wrapped by [`instrument`] the scope is a tokio task-local, so
//! concurrent requests on the same worker thread never see each other's
//! aggregators. Outside of an instrumented future (blocking workers,
//! synchronous callers) a thread-local slot is used instead.
//!
//! The free functions in this module (`start`, `stop`, `incr`, `timed`, …)
//! are for application code that wants to add its own measurements to the
//! current unit of work. They are no-ops when no scope is active.

mod lifecycle;

pub use lifecycle::{begin, clear, fail, finish};

use std::cell::RefCell;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use statsprism_core::{Counter, Timer};

tokio::task_local! {
    static TASK_SCOPE: RefCell<Scope>;
}

static GENERATION: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed)
}

thread_local! {
    static THREAD_SCOPE: RefCell<Scope> = RefCell::new(Scope::default());
}

/// Aggregators for the active unit of work.
#[derive(Debug, Default)]
pub struct Scope {
    pub(crate) timings: Option<Timer>,
    pub(crate) counter: Option<Counter>,
    pub(crate) counter_site: Option<Counter>,
    pub(crate) view: Option<String>,
    pub(crate) failed: bool,
    /// Distinguishes successive scopes on the same unit of work; 0 when idle.
    pub(crate) generation: u64,
}

impl Scope {
    pub fn is_active(&self) -> bool {
        self.timings.is_some()
    }

    pub fn timings(&self) -> Option<&Timer> {
        self.timings.as_ref()
    }

    pub fn counter(&self) -> Option<&Counter> {
        self.counter.as_ref()
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

fn in_task_scope() -> bool {
    TASK_SCOPE.try_with(|_| ()).is_ok()
}

/// Run `f` against the current unit of work's scope.
pub fn with_scope<R>(f: impl FnOnce(&mut Scope) -> R) -> R {
    if in_task_scope() {
        TASK_SCOPE.with(|cell| f(&mut cell.borrow_mut()))
    } else {
        THREAD_SCOPE.with(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Run `fut` with its own, initially idle, scope.
pub fn instrument<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    TASK_SCOPE.scope(RefCell::new(Scope::default()), fut)
}

/// Synchronous counterpart of [`instrument`].
pub fn instrument_sync<R>(f: impl FnOnce() -> R) -> R {
    TASK_SCOPE.sync_scope(RefCell::new(Scope::default()), f)
}

pub fn is_active() -> bool {
    with_scope(|s| s.is_active())
}

pub fn start(key: &str) {
    with_scope(|s| {
        if let Some(t) = s.timings.as_mut() {
            t.start(key);
        }
    });
}

/// Stop `key` on the active timer. Misuse is logged, not propagated.
pub fn stop(key: &str) -> Option<Duration> {
    with_scope(|s| {
        let t = s.timings.as_mut()?;
        match t.stop(key) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::error!(error = %e, code = e.code().as_str(), "scope timer stop failed");
                None
            }
        }
    })
}

pub fn incr(key: &str, delta: i64) {
    with_scope(|s| {
        if let Some(c) = s.counter.as_mut() {
            c.increment(key, delta);
        }
    });
}

pub fn decr(key: &str, delta: i64) {
    with_scope(|s| {
        if let Some(c) = s.counter.as_mut() {
            c.decrement(key, delta);
        }
    });
}

/// Time `key` until the guard drops. Inert when no scope is active.
pub fn timed(key: impl Into<String>) -> ScopeTimer {
    let key = key.into();
    let generation = with_scope(|s| {
        let t = s.timings.as_mut()?;
        t.start(&key);
        Some(s.generation)
    });
    ScopeTimer { key, generation }
}

/// Time a closure under `prefix.name`.
pub fn timed_call<R>(prefix: &str, name: &str, f: impl FnOnce() -> R) -> R {
    let _guard = timed(format!("{prefix}.{}", name.to_lowercase()));
    f()
}

/// Time a future under `key`, across all of its polls.
pub async fn timed_future<F: Future>(key: impl Into<String>, fut: F) -> F::Output {
    let _guard = timed(key);
    fut.await
}

/// Drop guard returned by [`timed`].
///
/// Bound to the scope that was active when it was armed: if that scope has
/// been flushed meanwhile, dropping the guard leaves any newer scope alone.
#[derive(Debug)]
pub struct ScopeTimer {
    key: String,
    generation: Option<u64>,
}

impl Drop for ScopeTimer {
    fn drop(&mut self) {
        let Some(generation) = self.generation else {
            return;
        };
        with_scope(|s| {
            if s.generation != generation {
                return;
            }
            if let Some(t) = s.timings.as_mut() {
                if t.is_running(&self.key) {
                    if let Err(e) = t.stop(&self.key) {
                        tracing::error!(error = %e, "scope timer guard stop failed");
                    }
                }
            }
        });
    }
}
