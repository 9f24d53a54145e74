//! Single-shot gzip responses.
//!
//! # Responsibilities
//! - Serialize a payload once, before any header is committed
//! - Compress the whole body through one compression session
//! - Map serialization failure to a plain, unencoded 500
//!
//! # Design Decisions
//! - Headers are stamped by the session, then the status, then the body
//! - A failed write leaves the body truncated; there is nothing to retry

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::compression::{BufferedSink, CompressionSession};
use crate::stream::frame::timestamp_now;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Body of `/gzip/json`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPayload {
    pub ok: bool,
    pub path: String,
    pub timestamp: String,
}

impl JsonPayload {
    pub fn for_path(path: &str) -> Self {
        Self {
            ok: true,
            path: path.to_string(),
            timestamp: timestamp_now(),
        }
    }
}

/// Serialize `payload` and answer 200 with a gzip-encoded JSON body.
pub fn gzip_json<T: Serialize>(payload: &T) -> Response {
    let body = match serde_json::to_vec(payload) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "JSON payload serialization failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "marshal error").into_response();
        }
    };

    write_gzip(StatusCode::OK, JSON_CONTENT_TYPE, &body)
}

/// Compress `body` in one pass and build the response around it.
pub fn write_gzip(status: StatusCode, content_type: &'static str, body: &[u8]) -> Response {
    let mut headers = HeaderMap::new();
    let mut session = CompressionSession::open(BufferedSink::new(), content_type, &mut headers);

    let mut response = Response::new(Body::empty());
    *response.headers_mut() = headers;
    *response.status_mut() = status;

    if let Err(e) = session.write(body) {
        tracing::warn!(error = %e, "write gzip body failed");
    }
    let compressed = match session.close() {
        Ok(sink) => sink.into_inner(),
        Err(e) => {
            tracing::warn!(error = %e, "closing gzip body failed");
            Vec::new()
        }
    };

    *response.body_mut() = Body::from(compressed);
    response
}
