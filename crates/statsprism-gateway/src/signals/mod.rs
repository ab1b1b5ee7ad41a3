//! Lifecycle signal dispatch.
//!
//! Framework adapters (HTTP middleware, task queue) emit typed [`Event`]s;
//! instrumentation hooks are [`Receiver`]s connected per [`EventKind`].

pub mod events;
pub mod registry;

pub use events::{Edge, Event, EventKind, TaskBody};
pub use registry::{Receiver, Signals};
