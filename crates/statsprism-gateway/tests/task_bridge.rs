//! Task publish → execute bridging: queue time, execution scope, failure.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use statsprism_core::error::Result;
use statsprism_core::{Metrics, RecordingClient};
use statsprism_gateway::app_state::AppState;
use statsprism_gateway::config::StatsprismConfig;
use statsprism_gateway::correlation::CorrelationStore;
use statsprism_gateway::hooks::{self, HookSettings};
use statsprism_gateway::scope;
use statsprism_gateway::signals::{Event, Signals, TaskBody};
use statsprism_gateway::tasks::{TaskHandler, TaskMessage, TaskOutcome, Worker};

fn state() -> (Arc<RecordingClient>, AppState) {
    let rec = Arc::new(RecordingClient::new());
    (rec.clone(), AppState::with_client(StatsprismConfig::default(), rec))
}

fn worker(st: &AppState) -> Worker {
    Worker::new(st.registry(), st.signals())
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn publish_then_execute() {
    let (rec, st) = state();
    let queue = st.queue();
    let mut rx = queue.declare("celery", 8);

    let id = queue.publish("tasks.debug", Some("celery"), json!({})).unwrap();
    assert_eq!(st.correlation().pending(), 1);

    let msg = rx.recv().await.unwrap();
    assert_eq!(msg.body.id, id);
    assert_eq!(worker(&st).execute(msg).await, TaskOutcome::Succeeded);

    assert_eq!(
        rec.names(),
        set(&[
            "celery.site.hit",
            "celery.tasks.debug.queue_celery.hit",
            "celery.tasks.debug.queue_celery.queue_time",
            "celery.tasks.debug.queue_celery.sent",
            "celery.tasks.debug.queue_celery.start",
            "celery.tasks.debug.queue_celery.total",
        ])
    );
    assert_eq!(st.correlation().pending(), 0);
}

#[tokio::test]
async fn uncorrelated_task_counts_queue_timeout() {
    let (rec, st) = state();
    let msg = TaskMessage {
        body: TaskBody {
            id: "T2".into(),
            task: "tasks.debug".into(),
            routing_key: Some("celery".into()),
        },
        payload: json!(null),
    };

    assert_eq!(worker(&st).execute(msg).await, TaskOutcome::Succeeded);

    assert_eq!(rec.count("celery.tasks.debug.queue_celery.queue_timeout"), 1);
    assert!(rec.timings("celery.tasks.debug.queue_celery.queue_time").is_empty());
    assert_eq!(rec.count("celery.tasks.debug.queue_celery.hit"), 1);
}

#[tokio::test]
async fn failed_task_flushes_once() {
    let (rec, st) = state();
    let queue = st.queue();
    let mut rx = queue.declare("celery", 8);

    queue
        .publish("tasks.fail", Some("celery"), json!({ "reason": "nope" }))
        .unwrap();
    let outcome = worker(&st).execute(rx.recv().await.unwrap()).await;
    assert_eq!(outcome, TaskOutcome::Failed("internal: nope".into()));

    let name = "celery.tasks.fail.queue_celery";
    assert_eq!(rec.count(&format!("{name}.fail")), 1);
    assert_eq!(rec.count(&format!("{name}.hit")), 1);
    assert_eq!(rec.timings(&format!("{name}.total")).len(), 1);
    assert_eq!(rec.count("celery.site.hit"), 1);
}

#[tokio::test]
async fn failure_without_routing_key_uses_bare_task_name() {
    let (rec, st) = state();
    let msg = TaskMessage {
        body: TaskBody {
            id: "T3".into(),
            task: "tasks.fail".into(),
            routing_key: None,
        },
        payload: json!({}),
    };

    worker(&st).execute(msg).await;

    // the start counter is keyed at prerun, before the failure name is known
    assert_eq!(rec.count("celery.tasks.fail.queue_celery.start"), 1);
    assert_eq!(rec.count("celery.tasks.fail.fail"), 1);
    assert_eq!(rec.count("celery.tasks.fail.hit"), 1);
    assert_eq!(rec.count("celery.tasks.fail.queue_celery.hit"), 0);
}

#[tokio::test]
async fn unregistered_task_counts_as_failure() {
    let (rec, st) = state();
    let msg = TaskMessage {
        body: TaskBody {
            id: "T4".into(),
            task: "tasks.nope".into(),
            routing_key: Some("celery".into()),
        },
        payload: json!({}),
    };

    assert_eq!(worker(&st).execute(msg).await, TaskOutcome::Unknown);
    assert_eq!(rec.count("celery.tasks.nope.queue_celery.fail"), 1);
}

struct PanicTask;

#[async_trait]
impl TaskHandler for PanicTask {
    fn name(&self) -> &'static str {
        "tasks.panic"
    }

    async fn run(&self, _payload: Value) -> Result<()> {
        panic!("disk on fire")
    }
}

#[tokio::test]
async fn panicking_task_keeps_its_message() {
    let (rec, st) = state();
    st.registry().register(Arc::new(PanicTask));
    let msg = TaskMessage {
        body: TaskBody {
            id: "T6".into(),
            task: "tasks.panic".into(),
            routing_key: Some("celery".into()),
        },
        payload: json!({}),
    };

    let outcome = worker(&st).execute(msg).await;
    assert_eq!(outcome, TaskOutcome::Failed("panicked: disk on fire".into()));
    assert_eq!(rec.count("celery.tasks.panic.queue_celery.fail"), 1);
}

#[tokio::test]
async fn rejected_publish_is_not_counted() {
    let (rec, st) = state();
    let queue = st.queue();
    let rx = queue.declare("celery", 1);

    queue.publish("tasks.debug", Some("celery"), json!({})).unwrap();

    let full = queue.publish("tasks.debug", Some("celery"), json!({})).unwrap_err();
    assert_eq!(full.code().as_str(), "INTERNAL");

    drop(rx);
    let closed = queue.publish("tasks.debug", Some("celery"), json!({})).unwrap_err();
    assert_eq!(closed.code().as_str(), "INTERNAL");

    assert_eq!(rec.count("celery.tasks.debug.queue_celery.sent"), 1);
    assert_eq!(st.correlation().pending(), 1);
}

#[tokio::test]
async fn routing_key_suffix_is_dropped() {
    let (rec, st) = state();
    let queue = st.queue();
    let mut rx = queue.declare("orders", 8);

    queue.publish("tasks.debug", Some("orders.fifo"), json!({})).unwrap();
    worker(&st).execute(rx.recv().await.unwrap()).await;

    assert_eq!(rec.count("celery.tasks.debug.queue_orders.sent"), 1);
    assert_eq!(rec.timings("celery.tasks.debug.queue_orders.queue_time").len(), 1);
}

#[tokio::test]
async fn publish_to_undeclared_queue_fails() {
    let (_rec, st) = state();
    let err = st.queue().publish("tasks.debug", Some("ghost"), json!({})).unwrap_err();
    assert_eq!(err.code().as_str(), "INTERNAL");
}

#[test]
fn expired_queue_timer_reads_as_timeout() {
    let rec = Arc::new(RecordingClient::new());
    let metrics = Metrics::new(rec.clone());
    let signals = Signals::new();
    let correlation = Arc::new(CorrelationStore::in_memory(Duration::ZERO));
    hooks::install(&signals, &metrics, correlation.clone(), &HookSettings::default());

    let body = TaskBody {
        id: "T5".into(),
        task: "t".into(),
        routing_key: None,
    };
    signals.emit(&Event::TaskPublished { body: &body });
    std::thread::sleep(Duration::from_millis(2));

    scope::instrument_sync(|| {
        signals.emit(&Event::TaskPrerun {
            task: "t",
            task_id: "T5",
            routing_key: None,
        });
        signals.emit(&Event::TaskPostrun {
            task: "t",
            routing_key: None,
        });
    });

    assert_eq!(rec.count("celery.t.queue_celery.sent"), 1);
    assert_eq!(rec.count("celery.t.queue_celery.queue_timeout"), 1);
    assert!(rec.timings("celery.t.queue_celery.queue_time").is_empty());
    assert_eq!(correlation.pending(), 0);
}

#[tokio::test]
async fn background_worker_drains_default_queue() {
    let (rec, st) = state();
    let handles = st.spawn_background();

    st.queue().publish("tasks.debug", None, json!({})).unwrap();

    let total = "celery.tasks.debug.queue_celery.total";
    tokio::time::timeout(Duration::from_secs(2), async {
        while rec.timings(total).is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker never ran the task");

    assert_eq!(rec.count("celery.tasks.debug.queue_celery.queue_timeout"), 0);
    for h in handles {
        h.abort();
    }
}
