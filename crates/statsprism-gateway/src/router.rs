//! Axum router wiring.
//!
//! Demo views are instrumented per route; the two tracking layers wrap the
//! whole router.

use axum::{middleware, routing::{get, MethodFilter}, Router};

use crate::transport::http::{self, view};
use crate::{app_state::AppState, ops, views};

pub fn build_router(state: AppState) -> Router {
    let signals = state.signals();
    Router::new()
        .route("/", view(&signals, MethodFilter::GET, views::index))
        .route("/boom", view(&signals, MethodFilter::GET, views::boom))
        .route("/tasks/:name", view(&signals, MethodFilter::POST, views::publish_task))
        .route("/healthz", get(ops::healthz))
        .route("/status", get(ops::status))
        .layer(middleware::from_fn_with_state(signals.clone(), http::track_substages))
        .layer(middleware::from_fn_with_state(signals, http::track_request))
        .with_state(state)
}
