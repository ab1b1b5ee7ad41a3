//! Concrete [`MetricsClient`] sinks selected by `statsd.sink`.

mod log;
mod statsd;

pub use log::LogSink;
pub use statsd::StatsdSink;

use std::sync::Arc;

use statsprism_core::error::{Result, StatsError};
use statsprism_core::{MetricsClient, NoopClient};

use crate::config::{SinkKind, StatsdSection};

pub fn build(cfg: &StatsdSection) -> Result<Arc<dyn MetricsClient>> {
    let sink: Arc<dyn MetricsClient> = match cfg.sink {
        SinkKind::Statsd => {
            let sink = StatsdSink::connect(&cfg.host, cfg.port)
                .map_err(|e| StatsError::Sink(format!("statsd sink: {e}")))?;
            tracing::info!(addr = %sink.agent_addr(), "statsd sink ready");
            Arc::new(sink)
        }
        SinkKind::Log => Arc::new(LogSink),
        SinkKind::Noop => Arc::new(NoopClient),
    };
    Ok(sink)
}
