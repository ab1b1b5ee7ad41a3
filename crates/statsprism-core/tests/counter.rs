//! Counter aggregation properties.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use statsprism_core::client::SampleValue;
use statsprism_core::{Metrics, RecordingClient};

fn setup() -> (Arc<RecordingClient>, Metrics) {
    let rec = Arc::new(RecordingClient::new());
    let metrics = Metrics::new(rec.clone());
    (rec, metrics)
}

#[test]
fn zero_net_delta_is_not_sent() {
    let (rec, m) = setup();
    let mut c = m.counter("view");
    c.increment("hit", 3);
    c.decrement("hit", 3);
    c.incr("miss");
    c.submit(&["get"]);

    assert_eq!(rec.names().into_iter().collect::<Vec<_>>(), vec!["view.get.miss"]);
}

#[test]
fn second_submit_sends_nothing() {
    let (rec, m) = setup();
    let mut c = m.counter("view");
    c.incr("hit");
    c.submit::<&str>(&[]);
    rec.take();

    c.submit::<&str>(&[]);
    assert!(rec.is_empty());
    assert_eq!(c.get("hit"), 0);
}

#[test]
fn empty_name_parts_are_skipped() {
    let (rec, m) = setup();
    let mut c = m.counter("view");
    c.incr("hit");
    c.submit(&["", "get", ""]);
    assert_eq!(rec.count("view.get.hit"), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Inc(u8, i64),
    Dec(u8, i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, 1i64..5).prop_map(|(k, d)| Op::Inc(k, d)),
        (0u8..4, 1i64..5).prop_map(|(k, d)| Op::Dec(k, d)),
    ]
}

proptest! {
    #[test]
    fn submit_emits_net_nonzero_deltas(ops in proptest::collection::vec(op(), 0..40)) {
        let (rec, m) = setup();
        let mut c = m.counter("p");
        let mut expected: HashMap<String, i64> = HashMap::new();

        for op in &ops {
            match op {
                Op::Inc(k, d) => {
                    let key = format!("k{k}");
                    c.increment(&key, *d);
                    *expected.entry(format!("p.{key}")).or_default() += d;
                }
                Op::Dec(k, d) => {
                    let key = format!("k{k}");
                    c.decrement(&key, *d);
                    *expected.entry(format!("p.{key}")).or_default() -= d;
                }
            }
        }
        expected.retain(|_, v| *v != 0);

        c.submit::<&str>(&[]);
        let emitted: HashMap<String, i64> = rec
            .take()
            .into_iter()
            .map(|s| match s.value {
                SampleValue::Count(d) => (s.name, d),
                SampleValue::Timing(_) => panic!("unexpected timing"),
            })
            .collect();
        prop_assert_eq!(emitted, expected);

        c.submit::<&str>(&[]);
        prop_assert!(rec.is_empty());
    }
}
