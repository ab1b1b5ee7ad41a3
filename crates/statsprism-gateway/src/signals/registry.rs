use std::sync::Arc;

use dashmap::DashMap;

use super::events::{Event, EventKind};

/// A named callback connected to one or more event kinds.
///
/// Receivers run synchronously on the emitting unit of work, so they must
/// not block beyond the single metrics flush at the end of a scope.
pub trait Receiver: Send + Sync {
    fn name(&self) -> &'static str;
    fn receive(&self, event: &Event<'_>);
}

/// Registry of receivers per event kind.
#[derive(Default)]
pub struct Signals {
    receivers: DashMap<EventKind, Vec<Arc<dyn Receiver>>>,
}

impl Signals {
    pub fn new() -> Self {
        Self {
            receivers: DashMap::new(),
        }
    }

    /// Connect `receiver` to `kind`. Receivers run in connection order.
    pub fn connect(&self, kind: EventKind, receiver: Arc<dyn Receiver>) {
        tracing::debug!(kind = kind.as_str(), receiver = receiver.name(), "signal connected");
        self.receivers.entry(kind).or_default().push(receiver);
    }

    pub fn connect_all(&self, kinds: &[EventKind], receiver: Arc<dyn Receiver>) {
        for kind in kinds {
            self.connect(*kind, Arc::clone(&receiver));
        }
    }

    pub fn registered(&self, kind: EventKind) -> Vec<&'static str> {
        self.receivers
            .get(&kind)
            .map(|r| r.value().iter().map(|rx| rx.name()).collect())
            .unwrap_or_default()
    }

    pub fn emit(&self, event: &Event<'_>) {
        // clone out so no shard lock is held while receivers run
        let Some(receivers) = self.receivers.get(&event.kind()).map(|r| r.value().clone()) else {
            return;
        };
        for rx in receivers {
            rx.receive(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tally(AtomicUsize);

    impl Receiver for Tally {
        fn name(&self) -> &'static str {
            "tally"
        }
        fn receive(&self, _event: &Event<'_>) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn emit_reaches_only_connected_kinds() {
        let signals = Signals::new();
        let tally = Arc::new(Tally(AtomicUsize::new(0)));
        signals.connect(EventKind::TaskPostrun, tally.clone());

        signals.emit(&Event::TaskPostrun { task: "t", routing_key: None });
        signals.emit(&Event::TaskFailure { task: "t", routing_key: None });

        assert_eq!(tally.0.load(Ordering::Relaxed), 1);
        assert_eq!(signals.registered(EventKind::TaskPostrun), vec!["tally"]);
        assert!(signals.registered(EventKind::TaskFailure).is_empty());
    }
}
