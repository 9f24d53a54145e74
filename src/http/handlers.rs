//! Endpoint handlers.
//!
//! ```text
//! GET /healthz    → 200 "ok", never compressed
//! GET /gzip/json  → single-shot gzip JSON
//! GET /gzip/sse   → timed gzip SSE stream (?chunks=&delayMs=)
//! ```

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::compression::{ChannelSink, ResponseSink};
use crate::http::response::{gzip_json as gzip_json_response, JsonPayload};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::stream::emitter::{EmitReport, SseEmitter};
use crate::stream::params::{ResponseConfig, StreamQuery};

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    metrics::record_request("healthz");
    (StatusCode::OK, "ok")
}

/// GET /gzip/json
pub async fn gzip_json(uri: Uri) -> Response {
    metrics::record_request("gzip_json");
    gzip_json_response(&JsonPayload::for_path(uri.path()))
}

/// GET /gzip/sse
///
/// Query parameters are taken as raw pairs so that malformed values fall
/// back to defaults instead of producing a rejection.
pub async fn gzip_sse(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    metrics::record_request("gzip_sse");

    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let config = ResponseConfig::from_query(&StreamQuery::from_pairs(pairs));
    tracing::debug!(
        chunks = config.chunk_count,
        delay_ms = config.chunk_delay.as_millis() as u64,
        "SSE parameters resolved"
    );

    let (sink, body) = ChannelSink::new(state.channel_capacity);
    sse_response(sink, body, config)
}

/// Start an emitter over `sink` on its own task and answer with `body`,
/// the receiving end of that sink.
pub fn sse_response<S>(sink: S, body: Body, config: ResponseConfig) -> Response
where
    S: ResponseSink + 'static,
{
    let mut headers = HeaderMap::new();
    let emitter = match SseEmitter::start(sink, config, &mut headers) {
        Ok(emitter) => emitter,
        Err(e) => {
            tracing::error!(error = %e, "SSE stream cannot start");
            metrics::record_stream_abort(e.reason());
            return (StatusCode::INTERNAL_SERVER_ERROR, "streaming not supported").into_response();
        }
    };

    tokio::spawn(async move {
        let report = emitter.run().await;
        log_report(&report);
    });

    let mut response = Response::new(body);
    *response.headers_mut() = headers;
    response
}

fn log_report(report: &EmitReport) {
    metrics::record_stream_duration(report.elapsed);

    match &report.error {
        None => tracing::debug!(
            frames = report.frames_sent,
            bytes = report.bytes_sent,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "SSE stream complete"
        ),
        Some(e) => {
            metrics::record_stream_abort(e.reason());
            tracing::warn!(
                error = %e,
                state = ?report.failed_in,
                frames_sent = report.frames_sent,
                bytes_sent = report.bytes_sent,
                completed = report.completed,
                "SSE stream ended early"
            );
        }
    }
}
