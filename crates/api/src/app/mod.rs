//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the invocation bridge and inventory root shared by handlers
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response envelope
//! - `errors.rs`: error-to-response translation
//! - `stream.rs`: response body sink for streamed records

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod stream;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Layers, outermost first: access log, panic recovery.
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::access_log))
                .layer(axum::middleware::from_fn(middleware::recover)),
        )
}
