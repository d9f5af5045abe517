use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use tracing::Instrument;
use uuid::Uuid;

use govm_core::GovmError;

use crate::app::errors::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One log line per request, inside a span carrying a fresh request id.
pub async fn access_log(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    let started = Instant::now();

    let mut response = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Turn a handler panic into a 500 `{"error": ...}` response.
pub async fn recover(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => ApiError::from(GovmError::unrecoverable(panic_message(payload.as_ref())))
            .into_response(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    fn guarded(router: Router) -> Router {
        router
            .layer(axum::middleware::from_fn(recover))
            .layer(axum::middleware::from_fn(access_log))
    }

    async fn get_path(app: Router, path: &str) -> Response {
        app.oneshot(axum::http::Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn panic_becomes_internal_server_error() {
        let app = guarded(Router::new().route("/boom", get(boom)));

        let resp = get_path(app, "/boom").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "unrecoverable fault: kaboom");
    }

    #[tokio::test]
    async fn router_keeps_serving_after_a_panic() {
        let app = guarded(
            Router::new()
                .route("/boom", get(boom))
                .route("/ok", get(|| async { "fine" })),
        );

        assert_eq!(
            get_path(app.clone(), "/boom").await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(get_path(app, "/ok").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = guarded(Router::new().route("/ok", get(|| async { "fine" })));
        let resp = get_path(app, "/ok").await;
        let id = resp.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn panic_message_handles_formatted_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(format!("bad vm {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "bad vm 7");
    }
}
