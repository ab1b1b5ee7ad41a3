//! Scope begin/flush/clear behaviour and unit-of-work isolation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use statsprism_core::{Metrics, RecordingClient};
use statsprism_gateway::scope;

fn setup() -> (Arc<RecordingClient>, Metrics) {
    let rec = Arc::new(RecordingClient::new());
    let metrics = Metrics::new(rec.clone()).with_global_prefix(Some("prefix".into()));
    (rec, metrics)
}

#[test]
fn bare_begin_finish_names() {
    let (rec, m) = setup();
    scope::instrument_sync(|| {
        scope::begin::<&str>(&m, "view", &[]);
        assert!(scope::finish::<&str>(&[]));
    });

    let names: Vec<String> = rec.names().into_iter().collect();
    assert_eq!(names, vec!["prefix.view.hit", "prefix.view.site.hit", "prefix.view.total"]);
}

#[test]
fn terminal_steps_are_idempotent() {
    let (rec, m) = setup();
    scope::instrument_sync(|| {
        scope::begin(&m, "celery", &["job"]);
        assert!(scope::fail(&["job"]));
        let sent = rec.samples().len();

        assert!(!scope::finish(&["job"]));
        assert!(!scope::fail(&["job"]));
        scope::clear();
        assert_eq!(rec.samples().len(), sent);
        assert!(!scope::is_active());
    });

    assert_eq!(rec.count("prefix.celery.job.start"), 1);
    assert_eq!(rec.count("prefix.celery.job.hit"), 1);
    assert_eq!(rec.count("prefix.celery.job.fail"), 1);
    assert_eq!(rec.count("prefix.celery.site.hit"), 1);
    assert_eq!(rec.timings("prefix.celery.job.total").len(), 1);
}

#[test]
fn helpers_are_noops_without_scope() {
    let (rec, _m) = setup();
    scope::instrument_sync(|| {
        scope::start("db");
        assert_eq!(scope::stop("db"), None);
        scope::incr("hit", 1);
        scope::decr("hit", 1);
        let _g = scope::timed("render");
        assert!(!scope::finish::<&str>(&[]));
    });
    assert!(rec.is_empty());
}

#[test]
fn helpers_feed_the_active_scope() {
    let (rec, m) = setup();
    scope::instrument_sync(|| {
        scope::begin::<&str>(&m, "view", &[]);
        scope::incr("cache_miss", 2);
        scope::decr("cache_miss", 1);
        {
            let _g = scope::timed("db");
        }
        let out = scope::timed_call("render", "Index", || 7);
        assert_eq!(out, 7);
        scope::start("nested");
        assert!(scope::stop("nested").is_some());
        assert_eq!(scope::stop("nested"), None);
        scope::finish(&["get", "x"]);
    });

    assert_eq!(rec.count("prefix.view.get.x.cache_miss"), 1);
    assert_eq!(rec.timings("prefix.view.get.x.db").len(), 1);
    assert_eq!(rec.timings("prefix.view.get.x.render.index").len(), 1);
    assert_eq!(rec.timings("prefix.view.get.x.nested").len(), 1);
}

#[test]
fn stale_guard_leaves_newer_scope_alone() {
    let (rec, m) = setup();
    scope::instrument_sync(|| {
        scope::begin::<&str>(&m, "view", &[]);
        let stale = scope::timed("db");
        scope::finish(&["first"]);

        scope::begin::<&str>(&m, "view", &[]);
        scope::start("db");
        drop(stale);
        assert!(scope::stop("db").is_some());
        scope::finish(&["second"]);
    });

    assert!(rec.timings("prefix.view.first.db").is_empty());
    assert_eq!(rec.timings("prefix.view.second.db").len(), 1);
}

#[test]
fn strict_mode_still_flushes_and_clears() {
    let rec = Arc::new(RecordingClient::new());
    let m = Metrics::new(rec.clone()).with_strict(true);
    scope::instrument_sync(|| {
        scope::begin::<&str>(&m, "view", &[]);
        scope::start("leaked");
        assert!(scope::finish(&["r"]));
        assert!(!scope::is_active());
    });
    assert_eq!(rec.timings("view.r.total").len(), 1);
    assert!(rec.timings("view.r.leaked").is_empty());
}

#[test]
fn thread_local_fallback_is_per_thread() {
    let (rec, m) = setup();
    scope::begin::<&str>(&m, "view", &[]);

    let other = std::thread::spawn(scope::is_active).join().unwrap();
    assert!(!other);

    assert!(scope::is_active());
    assert!(scope::finish(&["main"]));
    assert_eq!(rec.count("prefix.view.main.hit"), 1);
}

#[tokio::test]
async fn concurrent_units_of_work_do_not_share_state() {
    let (rec, m) = setup();

    let a = scope::instrument(async {
        scope::begin::<&str>(&m, "a", &[]);
        tokio::task::yield_now().await;
        scope::incr("x", 1);
        tokio::task::yield_now().await;
        scope::finish(&["r"]);
    });
    let b = scope::instrument(async {
        scope::begin::<&str>(&m, "b", &[]);
        tokio::task::yield_now().await;
        scope::incr("x", 5);
        scope::finish(&["r"]);
    });
    tokio::join!(a, b);

    assert_eq!(rec.count("prefix.a.r.x"), 1);
    assert_eq!(rec.count("prefix.b.r.x"), 5);
    assert_eq!(rec.count("prefix.a.r.hit"), 1);
    assert_eq!(rec.count("prefix.b.r.hit"), 1);
}

#[tokio::test]
async fn timed_future_spans_awaits() {
    let (rec, m) = setup();
    scope::instrument(async {
        scope::begin::<&str>(&m, "view", &[]);
        scope::timed_future("sleep", tokio::time::sleep(std::time::Duration::from_millis(5))).await;
        scope::finish(&["r"]);
    })
    .await;

    let t = rec.timings("prefix.view.r.sleep");
    assert_eq!(t.len(), 1);
    assert!(t[0] >= std::time::Duration::from_millis(5));
}
