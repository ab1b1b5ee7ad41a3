//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/status`  : registered tasks and pending queue timers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "tasks": state.registry().registered(),
        "pending_queue_timers": state.correlation().pending(),
        "default_queue": state.queue().default_queue(),
    }))
}
