//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use statsprism_core::error::{Result, StatsError};

pub use schema::{GatewaySection, SinkKind, StatsdSection, StatsprismConfig, TagsLike, TasksSection};

pub fn load_from_file(path: &str) -> Result<StatsprismConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| StatsError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<StatsprismConfig> {
    let cfg: StatsprismConfig = serde_yaml::from_str(s)
        .map_err(|e| StatsError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
