use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;

/// Logs 4xx responses at `warn` and 5xx at `error`. Only the machine
/// readable `code` of the error body is logged, never the body itself.
pub async fn log_error_responses(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }
    let latency_ms = start.elapsed().as_millis() as u64;

    let (mut parts, body) = response.into_parts();
    let (body, code) = match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
        Ok(bytes) => {
            let code = error_code(&bytes);
            (Body::from(bytes), code)
        }
        Err(err) => {
            tracing::warn!(error = ?err, "failed to buffer error response body");
            parts.headers.remove(CONTENT_LENGTH);
            (Body::empty(), None)
        }
    };
    let code = code.as_deref().unwrap_or("-");

    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), %method, path = %path, latency_ms, code, "request failed");
    } else {
        tracing::warn!(status = status.as_u16(), %method, path = %path, latency_ms, code, "request rejected");
    }

    Response::from_parts(parts, body)
}

fn error_code(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("code")?.as_str().map(str::to_owned)
}
