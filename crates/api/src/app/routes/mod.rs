use axum::{
    Router,
    routing::{get, post},
};

pub mod system;
pub mod vms;

/// Router for the VM endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/vms", get(vms::list_vms))
        .route("/vms/:alias", post(vms::stream_vm))
}
