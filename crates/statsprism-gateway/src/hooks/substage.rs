use crate::scope;
use crate::signals::{Edge, Event, Receiver};

/// Inner HTTP layer: closes the request-side substages opened by
/// [`super::RequestHook`] and opens the response-side ones it closes.
pub struct SubstageHook;

impl Receiver for SubstageHook {
    fn name(&self) -> &'static str {
        "statsd_substage_timer"
    }

    fn receive(&self, event: &Event<'_>) {
        if event.edge() != Some(Edge::Inner) {
            return;
        }
        match event {
            Event::RequestStarted { .. } => {
                scope::stop("process_request");
            }
            Event::ViewDispatched { .. } => {
                scope::stop("process_view");
            }
            Event::ExceptionRaised { .. } => scope::start("process_exception"),
            Event::TemplateResponse { .. } => scope::start("process_template_response"),
            Event::ResponseReady { .. } => scope::start("process_response"),
            _ => {}
        }
    }
}
