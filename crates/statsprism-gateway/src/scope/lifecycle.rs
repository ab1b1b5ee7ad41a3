//! Scope state machine: idle → active → flushed.
//!
//! `finish` and `fail` both converge on the same flush-and-clear step and
//! are no-ops on an idle scope, so whichever terminal event arrives second
//! (e.g. postrun after failure) does nothing.

use statsprism_core::Metrics;

use super::{next_generation, with_scope, Scope};

/// Activate a fresh scope under `prefix`.
///
/// When `started` is non-empty a one-shot `prefix.started….start` counter is
/// sent first. A scope that is still active is replaced; its data is lost.
pub fn begin<S: AsRef<str>>(metrics: &Metrics, prefix: &str, started: &[S]) {
    if !started.is_empty() {
        metrics.event_counter(prefix, "start", started, 1);
    }

    let mut timings = metrics.timer(prefix);
    timings.start("total");
    let mut counter = metrics.counter(prefix);
    counter.incr("hit");
    let mut counter_site = metrics.counter(prefix);
    counter_site.incr("hit");

    with_scope(|s| {
        if s.is_active() {
            tracing::warn!(prefix, "replacing an unflushed metrics scope");
        }
        *s = Scope {
            timings: Some(timings),
            counter: Some(counter),
            counter_site: Some(counter_site),
            view: None,
            failed: false,
            generation: next_generation(),
        };
    });
}

/// Successful end of the unit of work. Returns whether anything was flushed.
pub fn finish<S: AsRef<str>>(key: &[S]) -> bool {
    flush(key, false)
}

/// Failed end of the unit of work: counts `fail`, then flushes like `finish`.
pub fn fail<S: AsRef<str>>(key: &[S]) -> bool {
    flush(key, true)
}

/// Drop the scope without sending anything.
pub fn clear() {
    with_scope(|s| *s = Scope::default());
}

fn flush<S: AsRef<str>>(key: &[S], failed: bool) -> bool {
    // take everything first: the scope is idle again even if sending misbehaves
    let taken = with_scope(std::mem::take);
    let Scope {
        timings: Some(mut timings),
        counter,
        counter_site,
        ..
    } = taken
    else {
        return false;
    };

    if let Err(e) = timings.stop("total") {
        tracing::error!(error = %e, "scope total timer was not running");
    }
    if let Err(e) = timings.submit(key) {
        tracing::error!(error = %e, code = e.code().as_str(), "scope timer submit reported misuse");
    }
    if let Some(mut counter) = counter {
        if failed {
            counter.incr("fail");
        }
        counter.submit(key);
    }
    if let Some(mut site) = counter_site {
        site.submit(&["site"]);
    }
    true
}
