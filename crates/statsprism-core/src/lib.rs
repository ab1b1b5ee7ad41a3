//! statsprism core: aggregators, naming rules, and the metrics client
//! capability shared by the gateway and any other instrumented process.
//!
//! This crate carries no runtime or transport dependencies. It knows how to
//! buffer counts and timings for one unit of work and how to name them; it
//! does not know where a unit of work begins or ends.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Timer misuse
//! (stop without start, unstopped starts in strict mode) surfaces as
//! `StatsError` so an instrumentation bug never takes a request down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod aggregate;
pub mod client;
pub mod error;
pub mod naming;

pub use aggregate::{Counter, Metrics, Timer, TimerGuard};
pub use client::{MetricsClient, NoopClient, Prefixed, RecordingClient};
/// Shared result type.
pub use error::{Result, StatsError};
pub use naming::TagStyle;
