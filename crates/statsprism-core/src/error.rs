//! Shared error type across statsprism crates.

use thiserror::Error;

/// Stable error codes (used in logs and by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid configuration value.
    BadConfig,
    /// Unsupported config schema version.
    UnsupportedVersion,
    /// Timer stop without a matching start.
    TimerNotStarted,
    /// Timer submitted while starts were still pending (strict mode).
    UnstoppedTimers,
    /// Metrics sink could not be created.
    Sink,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in structured logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::TimerNotStarted => "TIMER_NOT_STARTED",
            ErrorCode::UnstoppedTimers => "UNSTOPPED_TIMERS",
            ErrorCode::Sink => "SINK",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("unable to stop tracking {key}, never started tracking it")]
    TimerNotStarted { key: String },
    #[error("timer(s) {keys:?} were started but never stopped")]
    UnstoppedTimers { keys: Vec<String> },
    #[error("sink: {0}")]
    Sink(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StatsError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StatsError::BadConfig(_) => ErrorCode::BadConfig,
            StatsError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            StatsError::TimerNotStarted { .. } => ErrorCode::TimerNotStarted,
            StatsError::UnstoppedTimers { .. } => ErrorCode::UnstoppedTimers,
            StatsError::Sink(_) => ErrorCode::Sink,
            StatsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
