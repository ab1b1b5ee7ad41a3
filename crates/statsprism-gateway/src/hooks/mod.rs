//! Instrumentation hooks: signal receivers that drive the metrics scope.
//!
//! - [`RequestHook`]: outer HTTP layer (scope begin/flush, view naming).
//! - [`SubstageHook`]: inner HTTP layer, only connected when middleware
//!   substage tracking is enabled.
//! - [`TaskHooks`]: task publish/prerun/postrun/failure bridging.

mod request;
mod substage;
mod tasks;

pub use request::RequestHook;
pub use substage::SubstageHook;
pub use tasks::TaskHooks;

use std::sync::Arc;

use statsprism_core::{Metrics, TagStyle};

use crate::config::StatsprismConfig;
use crate::correlation::CorrelationStore;
use crate::signals::{EventKind, Signals};

/// Prefix of every HTTP request scope.
pub const VIEW_PREFIX: &str = "view";

/// Naming and tracking switches shared by the hooks.
#[derive(Debug, Clone)]
pub struct HookSettings {
    pub tag_style: TagStyle,
    pub track_middleware: bool,
    pub task_label: String,
    pub default_queue: String,
}

impl HookSettings {
    pub fn from_config(cfg: &StatsprismConfig) -> Self {
        Self {
            tag_style: cfg.statsd.tag_style(),
            track_middleware: cfg.statsd.track_middleware,
            task_label: cfg.tasks.label.clone(),
            default_queue: cfg.tasks.default_queue.clone(),
        }
    }
}

impl Default for HookSettings {
    fn default() -> Self {
        Self::from_config(&StatsprismConfig::default())
    }
}

/// Connect all hooks to `signals`.
pub fn install(
    signals: &Signals,
    metrics: &Metrics,
    correlation: Arc<CorrelationStore>,
    settings: &HookSettings,
) {
    signals.connect_all(
        &EventKind::HTTP,
        Arc::new(RequestHook::new(metrics.clone(), settings.tag_style, settings.track_middleware)),
    );
    if settings.track_middleware {
        signals.connect_all(&EventKind::HTTP, Arc::new(SubstageHook));
    }
    signals.connect_all(
        &EventKind::TASK,
        Arc::new(TaskHooks::new(
            metrics.clone(),
            correlation,
            settings.task_label.clone(),
            settings.default_queue.clone(),
        )),
    );
    tracing::info!(
        tag_style = ?settings.tag_style,
        track_middleware = settings.track_middleware,
        task_label = %settings.task_label,
        "instrumentation hooks installed"
    );
}
