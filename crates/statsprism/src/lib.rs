//! statsprism: per-request and per-task statsd metrics.
//!
//! Depend on this crate alone to get the aggregators ([`core`]) and the
//! axum/task-queue instrumentation ([`gateway`]). Application code that
//! only adds its own measurements to the current unit of work needs just
//! the [`prelude`].

pub mod core {
    pub use statsprism_core::*;
}

pub mod gateway {
    pub use statsprism_gateway::*;
}

/// Ad-hoc measurement helpers for handlers and task bodies.
pub mod prelude {
    pub use statsprism_core::{Metrics, MetricsClient, StatsError};
    pub use statsprism_gateway::scope::{decr, incr, start, stop, timed, timed_call, timed_future};
    pub use statsprism_gateway::transport::http::TemplateRendered;
}

use statsprism_core::error::Result;
use statsprism_gateway::{app_state::AppState, config};

/// Load `path`, build its sink and wire every hook.
pub fn from_config_file(path: &str) -> Result<AppState> {
    let cfg = config::load_from_file(path)?;
    AppState::new(cfg)
}
