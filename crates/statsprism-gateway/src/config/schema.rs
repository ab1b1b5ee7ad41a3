use std::time::Duration;

use serde::Deserialize;
use statsprism_core::error::{Result, StatsError};
use statsprism_core::naming::{TagStyle, TAGS_LIKE_SUPPORTED};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsprismConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub statsd: StatsdSection,

    #[serde(default)]
    pub tasks: TasksSection,
}

impl StatsprismConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StatsError::UnsupportedVersion);
        }

        self.statsd.validate()?;
        self.tasks.validate()?;

        Ok(())
    }
}

impl Default for StatsprismConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            statsd: StatsdSection::default(),
            tasks: TasksSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// Where flushed metrics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// UDP statsd line protocol.
    #[default]
    Statsd,
    /// `tracing` events, one per metric.
    Log,
    /// Discard.
    Noop,
}

/// `tags_like` accepts `true`/`false` or a separator token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagsLike {
    Flag(bool),
    Token(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsdSection {
    #[serde(default)]
    pub sink: SinkKind,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Global prefix prepended to every metric name.
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub tags_like: Option<TagsLike>,

    /// Time the gaps between the outer and inner middleware layers.
    #[serde(default)]
    pub track_middleware: bool,

    /// Strict timers: report starts never stopped at flush time.
    #[serde(default)]
    pub debug: bool,
}

impl Default for StatsdSection {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            host: default_host(),
            port: default_port(),
            prefix: None,
            tags_like: None,
            track_middleware: false,
            debug: false,
        }
    }
}

impl StatsdSection {
    pub fn validate(&self) -> Result<()> {
        if self.sink == SinkKind::Statsd {
            if self.host.trim().is_empty() {
                return Err(StatsError::BadConfig("statsd.host must not be empty".into()));
            }
            if self.port == 0 {
                return Err(StatsError::BadConfig("statsd.port must not be 0".into()));
            }
        }
        if let Some(p) = &self.prefix {
            if p.starts_with('.') || p.ends_with('.') {
                return Err(StatsError::BadConfig(
                    "statsd.prefix must not start or end with '.'".into(),
                ));
            }
        }
        Ok(())
    }

    /// Resolve `tags_like`. Unsupported tokens disable tagging with a warning.
    pub fn tag_style(&self) -> TagStyle {
        match &self.tags_like {
            None | Some(TagsLike::Flag(false)) => TagStyle::Off,
            Some(TagsLike::Flag(true)) => TagStyle::Is,
            Some(TagsLike::Token(t)) => TagStyle::from_token(t).unwrap_or_else(|| {
                tracing::warn!(
                    token = %t,
                    supported = ?TAGS_LIKE_SUPPORTED,
                    "unsupported statsd.tags_like, tag-like naming disabled"
                );
                TagStyle::Off
            }),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8125
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TasksSection {
    /// Prefix label for task metrics.
    #[serde(default = "default_label")]
    pub label: String,

    /// Queue used when a task carries no routing key.
    #[serde(default = "default_queue")]
    pub default_queue: String,

    #[serde(default = "default_correlation_ttl_secs")]
    pub correlation_ttl_secs: u64,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            label: default_label(),
            default_queue: default_queue(),
            correlation_ttl_secs: default_correlation_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl TasksSection {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("tasks.label", &self.label),
            ("tasks.default_queue", &self.default_queue),
        ] {
            if v.is_empty() || v.contains('.') {
                return Err(StatsError::BadConfig(format!(
                    "{field} must be non-empty and contain no '.'"
                )));
            }
        }
        if !(1..=86_400).contains(&self.correlation_ttl_secs) {
            return Err(StatsError::BadConfig(
                "tasks.correlation_ttl_secs must be between 1 and 86400".into(),
            ));
        }
        if !(1..=3_600).contains(&self.sweep_interval_secs) {
            return Err(StatsError::BadConfig(
                "tasks.sweep_interval_secs must be between 1 and 3600".into(),
            ));
        }
        Ok(())
    }

    pub fn correlation_ttl(&self) -> Duration {
        Duration::from_secs(self.correlation_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_label() -> String {
    "celery".into()
}
fn default_queue() -> String {
    "celery".into()
}
fn default_correlation_ttl_secs() -> u64 {
    3_600
}
fn default_sweep_interval_secs() -> u64 {
    60
}
