use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

/// Stamps every request with an `x-request-id` and logs method, path,
/// status and latency. Health probes are skipped to keep the log usable.
pub async fn request_logger_middleware(mut req: Request<Body>, next: Next<Body>) -> Response {
    let path = req.uri().path().to_string();
    if path == "/health" {
        return next.run(req).await;
    }

    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let start = Instant::now();

    if let Ok(value) = request_id.parse() {
        req.headers_mut().insert("x-request-id", value);
    }

    let response: Response = next.run(req).await;

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = %status.as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    let (mut parts, body) = response.into_parts();
    if let Ok(value) = request_id.parse() {
        parts.headers.insert("x-request-id", value);
    }

    Response::from_parts(parts, body)
}
