//! statsprism gateway library entry.
//!
//! Wires per-unit-of-work metrics scopes into an axum HTTP pipeline and an
//! in-process task queue: lifecycle signals, instrumentation hooks, the
//! publish/execute correlation store and the metrics sinks. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod correlation;
pub mod hooks;
pub mod ops;
pub mod router;
pub mod scope;
pub mod signals;
pub mod sink;
pub mod tasks;
pub mod transport;
pub mod views;
