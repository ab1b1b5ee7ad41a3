//! Demo views served by the gateway binary.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use statsprism_core::error::StatsError;

use crate::app_state::AppState;
use crate::scope;
use crate::transport::http::TemplateRendered;

/// HTTP mapping for core errors returned by views.
pub struct ApiError(StatsError);

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            StatsError::BadConfig(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.0.code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub async fn index() -> impl IntoResponse {
    let body = scope::timed_call("render", "index", || "<h1>statsprism</h1>".to_string());
    (Extension(TemplateRendered), Html(body))
}

pub async fn boom() -> impl IntoResponse {
    scope::incr("boom", 1);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishQuery {
    #[serde(default)]
    pub routing_key: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

pub async fn publish_task(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<PublishQuery>,
) -> Result<Json<Value>, ApiError> {
    if state.registry().get(&name).is_none() {
        return Err(StatsError::BadConfig(format!("unknown task: {name}")).into());
    }
    let payload = req.payload.unwrap_or(Value::Null);
    let id = state.queue().publish(&name, req.routing_key.as_deref(), payload)?;
    Ok(Json(json!({ "id": id, "task": name })))
}
