use statsprism_core::naming::{self, TagStyle};
use statsprism_core::Metrics;

use crate::scope;
use crate::signals::{Edge, Event, Receiver};

use super::VIEW_PREFIX;

/// Outer HTTP layer: owns the request scope from start to flush.
pub struct RequestHook {
    metrics: Metrics,
    tag_style: TagStyle,
    track_middleware: bool,
}

impl RequestHook {
    pub fn new(metrics: Metrics, tag_style: TagStyle, track_middleware: bool) -> Self {
        Self {
            metrics,
            tag_style,
            track_middleware,
        }
    }

    fn on_request(&self) {
        scope::begin::<&str>(&self.metrics, VIEW_PREFIX, &[]);
        if self.track_middleware {
            scope::start("process_request");
        }
    }

    fn on_view(&self, handler: &str) {
        if self.track_middleware {
            scope::start("process_view");
        }
        let view = naming::view_label(self.tag_style, handler);
        scope::with_scope(|s| {
            if s.is_active() {
                s.view = Some(view);
            }
        });
    }

    fn on_exception(&self) {
        if self.track_middleware {
            scope::stop("process_exception");
        }
        scope::with_scope(|s| s.failed = s.is_active());
    }

    fn on_template(&self) {
        if self.track_middleware {
            scope::stop("process_template_response");
        }
    }

    fn on_response(&self, method: &str, ajax: bool) {
        if self.track_middleware {
            scope::stop("process_response");
        }
        let (view, failed) = scope::with_scope(|s| (s.view.take(), s.failed));

        // requests that never reached a view (404, rejected early) are not reported
        let Some(view) = view else {
            scope::clear();
            return;
        };

        let parts = naming::request_parts(self.tag_style, method, &view, ajax);
        if failed {
            scope::fail(&parts);
        } else {
            scope::finish(&parts);
        }
    }
}

impl Receiver for RequestHook {
    fn name(&self) -> &'static str {
        "statsd_request"
    }

    fn receive(&self, event: &Event<'_>) {
        if event.edge() != Some(Edge::Outer) {
            return;
        }
        match *event {
            Event::RequestStarted { .. } => self.on_request(),
            Event::ViewDispatched { handler, .. } => self.on_view(handler),
            Event::ExceptionRaised { .. } => self.on_exception(),
            Event::TemplateResponse { .. } => self.on_template(),
            Event::ResponseReady { method, ajax, .. } => self.on_response(method, ajax),
            _ => {}
        }
    }
}
