//! axum adapters that emit the HTTP lifecycle signals.
//!
//! Layering (outermost first):
//! - [`track_request`]: opens a fresh task-local scope, emits `Outer` events.
//! - other application middleware
//! - [`track_substages`]: emits `Inner` events.
//! - per-route [`dispatch_view`]: emits view dispatch with the handler name.
//!
//! A 5xx response or a panic in the handler counts as an exception. Panics
//! are resumed after the scope has been flushed.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    handler::Handler,
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    routing::{on, MethodFilter, MethodRouter},
};
use futures_util::FutureExt;
use statsprism_core::naming;

use crate::scope;
use crate::signals::{Edge, Event, Signals};

/// Response extension set by handlers that rendered a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRendered;

/// Per-route state for [`dispatch_view`].
#[derive(Clone)]
pub struct ViewRoute {
    signals: Arc<Signals>,
    handler: Arc<str>,
}

impl ViewRoute {
    /// Name the route after the handler's fully qualified path.
    pub fn of<H>(signals: &Arc<Signals>, _handler: &H) -> Self {
        Self::named(signals, naming::handler_path(std::any::type_name::<H>()))
    }

    pub fn named(signals: &Arc<Signals>, handler: impl Into<String>) -> Self {
        Self {
            signals: Arc::clone(signals),
            handler: Arc::from(handler.into()),
        }
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }
}

/// `on(filter, handler)` with view dispatch instrumentation attached.
pub fn view<H, T, S>(signals: &Arc<Signals>, filter: MethodFilter, handler: H) -> MethodRouter<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    let route = ViewRoute::of(signals, &handler);
    on(filter, handler).layer(middleware::from_fn_with_state(route, dispatch_view))
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

fn emit_response(signals: &Signals, edge: Edge, method: &str, ajax: bool, resp: Option<&Response>) {
    let failed = resp.map_or(true, |r| r.status().is_server_error());
    if failed {
        signals.emit(&Event::ExceptionRaised { edge });
    }
    if resp.is_some_and(|r| r.extensions().get::<TemplateRendered>().is_some()) {
        signals.emit(&Event::TemplateResponse { edge });
    }
    signals.emit(&Event::ResponseReady { edge, method, ajax });
}

async fn run_edge(signals: &Signals, edge: Edge, req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_string();
    let ajax = is_ajax(req.headers());

    signals.emit(&Event::RequestStarted { edge });
    let outcome: Result<Response, Box<dyn Any + Send>> =
        AssertUnwindSafe(next.run(req)).catch_unwind().await;

    match outcome {
        Ok(resp) => {
            emit_response(signals, edge, &method, ajax, Some(&resp));
            resp
        }
        Err(panic) => {
            emit_response(signals, edge, &method, ajax, None);
            std::panic::resume_unwind(panic)
        }
    }
}

/// Outermost instrumentation layer.
pub async fn track_request(
    State(signals): State<Arc<Signals>>,
    req: Request,
    next: Next,
) -> Response {
    scope::instrument(async move { run_edge(&signals, Edge::Outer, req, next).await }).await
}

/// Innermost router-level instrumentation layer.
pub async fn track_substages(
    State(signals): State<Arc<Signals>>,
    req: Request,
    next: Next,
) -> Response {
    run_edge(&signals, Edge::Inner, req, next).await
}

/// Per-route layer announcing which handler serves the request.
pub async fn dispatch_view(State(route): State<ViewRoute>, req: Request, next: Next) -> Response {
    route.signals.emit(&Event::ViewDispatched {
        edge: Edge::Outer,
        handler: route.handler(),
    });
    route.signals.emit(&Event::ViewDispatched {
        edge: Edge::Inner,
        handler: route.handler(),
    });
    next.run(req).await
}
