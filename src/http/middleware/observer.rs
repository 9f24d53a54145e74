//! Request logging middleware.
//!
//! Logs every request before it is handled. Reads headers only, so it has no
//! effect on what the handlers send back.

use axum::body::Body;
use axum::http::header::ACCEPT_ENCODING;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::request::RequestIdExt;

pub async fn log_request(request: Request<Body>, next: Next) -> Response {
    let accept_encoding = request
        .headers()
        .get(ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    tracing::info!(
        request_id = %request.request_id(),
        method = %request.method(),
        uri = %request.uri(),
        accept_encoding = ?accept_encoding,
        "Request received"
    );

    next.run(request).await
}
