//! Metrics collection and exposition.
//!
//! # Metrics
//! - `upstream_requests_total` (counter): requests by endpoint
//! - `upstream_sse_frames_total` (counter): SSE frames delivered to the transport
//! - `upstream_sse_aborted_total` (counter): streams cut short, by reason
//! - `upstream_sse_duration_seconds` (histogram): lifetime of each SSE stream
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests and
//!   metrics-disabled deployments pay nothing
//! - The Prometheus exporter runs its own listener, off the request path

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and start its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_counter!("upstream_requests_total", "Requests served, by endpoint");
    describe_counter!(
        "upstream_sse_frames_total",
        "SSE frames compressed, flushed and handed to the transport"
    );
    describe_counter!(
        "upstream_sse_aborted_total",
        "SSE streams aborted before the sentinel, by reason"
    );
    describe_histogram!(
        "upstream_sse_duration_seconds",
        "Time from first frame to stream close"
    );

    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Count a request against its endpoint label.
pub fn record_request(endpoint: &'static str) {
    counter!("upstream_requests_total", "endpoint" => endpoint).increment(1);
}

/// Count one delivered SSE frame.
pub fn record_frame() {
    counter!("upstream_sse_frames_total").increment(1);
}

/// Count an aborted SSE stream.
pub fn record_stream_abort(reason: &'static str) {
    counter!("upstream_sse_aborted_total", "reason" => reason).increment(1);
}

/// Record how long an SSE stream stayed open.
pub fn record_stream_duration(elapsed: Duration) {
    histogram!("upstream_sse_duration_seconds").record(elapsed.as_secs_f64());
}
