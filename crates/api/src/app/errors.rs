use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use govm_core::{ErrorKind, GovmError};

/// Handler error. Converting it into a response is the single place that
/// picks the status code and writes the `{"error": ...}` envelope.
#[derive(Debug)]
pub struct ApiError(pub GovmError);

impl From<GovmError> for ApiError {
    fn from(err: GovmError) -> Self {
        Self(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Invocation | ErrorKind::Io => StatusCode::BAD_REQUEST,
        ErrorKind::Configuration | ErrorKind::Unrecoverable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request failed");
        }
        json_error(status, self.0.to_string())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}
