use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::middleware::request_id::RequestId;
use crate::utils::redact::redact_path;

/// Logs every 4xx/5xx response. Paths are redacted because validate URLs
/// carry the token itself; bodies are not logged since they hold student ids.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = redact_path(req.uri().path());
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        log_error_event(
            status.as_u16(),
            &method,
            &path,
            &request_id,
            start.elapsed().as_millis() as u64,
        );
    }

    response
}

fn log_error_event(status: u16, method: &str, path: &str, request_id: &str, latency_ms: u64) {
    if status >= 500 {
        tracing::error!(
            status,
            method,
            path,
            request_id,
            latency_ms,
            "Request completed with error status"
        );
    } else {
        tracing::warn!(
            status,
            method,
            path,
            request_id,
            latency_ms,
            "Request completed with error status"
        );
    }
}
