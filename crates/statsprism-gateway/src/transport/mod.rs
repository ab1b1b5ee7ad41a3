//! Framework adapters.
//!
//! - `http`: axum middleware emitting HTTP lifecycle signals.

pub mod http;
