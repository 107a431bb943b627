// src/logging_middleware.rs
//! Middleware for logging inbound request bodies in debug mode
//!
//! Webhook payloads are the only way to see what Telegram actually sent, so
//! the raw body is logged at debug level before the handler runs.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub async fn log_request_body(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        if let Ok(body_str) = std::str::from_utf8(&bytes) {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %body_str,
                "Inbound request"
            );
        }
    }

    let request = Request::from_parts(parts, Body::from(bytes));

    Ok(next.run(request).await)
}
