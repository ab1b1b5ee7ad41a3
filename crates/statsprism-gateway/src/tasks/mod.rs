//! In-process task queue emitting the task lifecycle signals.
//!
//! Publishing fires `TaskPublished` and enqueues; a [`Worker`] wraps each
//! execution in a fresh scope and fires prerun, then failure (if any), then
//! postrun.

mod builtin;
mod queue;
mod registry;
mod worker;

pub use builtin::{DebugTask, FailTask};
pub use queue::{TaskMessage, TaskQueue};
pub use registry::{TaskHandler, TaskRegistry};
pub use worker::{TaskOutcome, Worker};
