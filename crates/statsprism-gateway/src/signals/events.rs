//! Typed lifecycle events.
//!
//! HTTP events carry an [`Edge`]: the outermost instrumentation layer sees
//! `Outer`, the innermost sees `Inner`. Substage timings are the gaps
//! between the two.

use serde::{Deserialize, Serialize};

/// Which instrumentation layer emitted an HTTP event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Outer,
    Inner,
}

/// Task envelope as assigned at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBody {
    /// Unique id (UUID v4), the correlation key.
    pub id: String,
    /// Registered task name, e.g. `tasks.debug`.
    pub task: String,
    /// Routing key / queue the task was published to, if explicit.
    #[serde(default)]
    pub routing_key: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    RequestStarted { edge: Edge },
    ViewDispatched { edge: Edge, handler: &'a str },
    ResponseReady { edge: Edge, method: &'a str, ajax: bool },
    ExceptionRaised { edge: Edge },
    TemplateResponse { edge: Edge },
    TaskPublished { body: &'a TaskBody },
    TaskPrerun { task: &'a str, task_id: &'a str, routing_key: Option<&'a str> },
    TaskPostrun { task: &'a str, routing_key: Option<&'a str> },
    TaskFailure { task: &'a str, routing_key: Option<&'a str> },
}

/// Registration key for receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RequestStarted,
    ViewDispatched,
    ResponseReady,
    ExceptionRaised,
    TemplateResponse,
    TaskPublished,
    TaskPrerun,
    TaskPostrun,
    TaskFailure,
}

impl EventKind {
    pub const HTTP: [EventKind; 5] = [
        EventKind::RequestStarted,
        EventKind::ViewDispatched,
        EventKind::ResponseReady,
        EventKind::ExceptionRaised,
        EventKind::TemplateResponse,
    ];

    pub const TASK: [EventKind; 4] = [
        EventKind::TaskPublished,
        EventKind::TaskPrerun,
        EventKind::TaskPostrun,
        EventKind::TaskFailure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::RequestStarted => "request_started",
            EventKind::ViewDispatched => "view_dispatched",
            EventKind::ResponseReady => "response_ready",
            EventKind::ExceptionRaised => "exception_raised",
            EventKind::TemplateResponse => "template_response",
            EventKind::TaskPublished => "task_published",
            EventKind::TaskPrerun => "task_prerun",
            EventKind::TaskPostrun => "task_postrun",
            EventKind::TaskFailure => "task_failure",
        }
    }
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RequestStarted { .. } => EventKind::RequestStarted,
            Event::ViewDispatched { .. } => EventKind::ViewDispatched,
            Event::ResponseReady { .. } => EventKind::ResponseReady,
            Event::ExceptionRaised { .. } => EventKind::ExceptionRaised,
            Event::TemplateResponse { .. } => EventKind::TemplateResponse,
            Event::TaskPublished { .. } => EventKind::TaskPublished,
            Event::TaskPrerun { .. } => EventKind::TaskPrerun,
            Event::TaskPostrun { .. } => EventKind::TaskPostrun,
            Event::TaskFailure { .. } => EventKind::TaskFailure,
        }
    }

    /// Edge of an HTTP event; `None` for task events.
    pub fn edge(&self) -> Option<Edge> {
        match self {
            Event::RequestStarted { edge }
            | Event::ViewDispatched { edge, .. }
            | Event::ResponseReady { edge, .. }
            | Event::ExceptionRaised { edge }
            | Event::TemplateResponse { edge } => Some(*edge),
            _ => None,
        }
    }
}
