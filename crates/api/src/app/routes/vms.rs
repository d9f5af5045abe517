use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use govm_core::{VmName, demo_sequence, emit};

use crate::app::dto::Envelope;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::app::stream;

/// GET /vms
///
/// Names of the VMs under the configured inventory root, relative to it.
pub async fn list_vms(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Envelope<Vec<VmName>>>, ApiError> {
    let vms = govm_core::list_vms(&services.bridge, &services.vm_path).await?;
    Ok(Json(Envelope::new(vms)))
}

/// POST /vms/:alias
///
/// Streams progress records as newline-delimited JSON. The status line and
/// headers are committed before the first record; a failure after that point
/// ends the body early and is only logged.
pub async fn stream_vm(Path(alias): Path<String>) -> Response {
    let (mut sink, body) = stream::channel();

    tokio::spawn(async move {
        match emit(&mut sink, demo_sequence()).await {
            Ok(records) => tracing::info!(%alias, records, "stream finished"),
            Err(e) => tracing::warn!(%alias, error = %e, "stream aborted"),
        }
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
