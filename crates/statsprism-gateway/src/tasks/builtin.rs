use async_trait::async_trait;
use serde_json::Value;

use statsprism_core::error::{Result, StatsError};

use super::TaskHandler;

/// Does nothing; useful for exercising the queue end to end.
#[derive(Default)]
pub struct DebugTask;

#[async_trait]
impl TaskHandler for DebugTask {
    fn name(&self) -> &'static str {
        "tasks.debug"
    }

    async fn run(&self, payload: Value) -> Result<()> {
        tracing::debug!(%payload, "debug task ran");
        Ok(())
    }
}

/// Always fails with the payload's `reason` (or a default message).
#[derive(Default)]
pub struct FailTask;

#[async_trait]
impl TaskHandler for FailTask {
    fn name(&self) -> &'static str {
        "tasks.fail"
    }

    async fn run(&self, payload: Value) -> Result<()> {
        let reason = payload
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("requested failure");
        Err(StatsError::Internal(reason.to_string()))
    }
}
