//! Phase-driven encoding probe.

use axum::http::header::{ACCEPT_ENCODING, CONTENT_ENCODING};
use axum::http::{HeaderMap, StatusCode};

use crate::probe::config::ProbeConfig;

/// Lifecycle position of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePhase {
    AwaitingRequest,
    AwaitingResponse,
    Streaming,
    Done,
}

/// State carried from one phase to the next for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeContext {
    pub request_accept_encoding: String,
    pub response_content_encoding: String,
    pub response_status: String,
    pub streaming_body_invoked: bool,
}

/// Final observation, produced once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSummary {
    pub context: ProbeContext,
    pub body_chunks: u64,
    pub body_bytes: u64,
}

impl ProbeSummary {
    pub fn callback_state(&self) -> &'static str {
        if self.context.streaming_body_invoked {
            "EXECUTED"
        } else {
            "NOT_EXECUTED"
        }
    }
}

/// Per-request probe invoked by its host at phase boundaries.
///
/// A probe dropped before `on_stream_done` (e.g. the client hung up) emits
/// its summary from `Drop`.
#[derive(Debug)]
pub struct EncodingProbe {
    config: ProbeConfig,
    phase: ProbePhase,
    context: ProbeContext,
    body_chunks: u64,
    body_bytes: u64,
}

impl EncodingProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            phase: ProbePhase::AwaitingRequest,
            context: ProbeContext::default(),
            body_chunks: 0,
            body_bytes: 0,
        }
    }

    pub fn phase(&self) -> ProbePhase {
        self.phase
    }

    pub fn context(&self) -> &ProbeContext {
        &self.context
    }

    pub fn on_request_headers(&mut self, headers: &HeaderMap) {
        self.expect_phase("request_headers", ProbePhase::AwaitingRequest);

        self.context.request_accept_encoding = header_text(headers, ACCEPT_ENCODING.as_str());
        self.context.streaming_body_invoked = false;
        self.phase = ProbePhase::AwaitingResponse;

        if self.config.debug_mode {
            tracing::warn!(
                accept_encoding = ?self.context.request_accept_encoding,
                "encoding probe: request headers"
            );
        }
    }

    pub fn on_response_headers(&mut self, status: StatusCode, headers: &HeaderMap) {
        self.expect_phase("response_headers", ProbePhase::AwaitingResponse);

        self.context.response_content_encoding = header_text(headers, CONTENT_ENCODING.as_str());
        self.context.response_status = status.as_u16().to_string();
        self.phase = ProbePhase::Streaming;

        if self.config.debug_mode {
            tracing::warn!(
                status = ?self.context.response_status,
                content_encoding = ?self.context.response_content_encoding,
                "encoding probe: response headers"
            );
        }
    }

    /// Observe one body chunk and hand it back untouched.
    pub fn on_body_chunk<'a>(&mut self, chunk: &'a [u8], end_of_stream: bool) -> &'a [u8] {
        self.expect_phase("body_chunk", ProbePhase::Streaming);

        self.context.streaming_body_invoked = true;
        self.body_chunks += 1;
        self.body_bytes += chunk.len() as u64;

        if self.config.debug_mode {
            tracing::warn!(
                chunk = chunk.len(),
                end_of_stream,
                "encoding probe: body chunk"
            );
        }
        chunk
    }

    /// Close the probe and log its summary. Only the first call reports.
    pub fn on_stream_done(&mut self) -> Option<ProbeSummary> {
        if self.phase == ProbePhase::Done {
            return None;
        }
        self.phase = ProbePhase::Done;

        let summary = ProbeSummary {
            context: self.context.clone(),
            body_chunks: self.body_chunks,
            body_bytes: self.body_bytes,
        };

        tracing::warn!(
            callback = summary.callback_state(),
            request.accept_encoding = ?summary.context.request_accept_encoding,
            response.content_encoding = ?summary.context.response_content_encoding,
            response.status = ?summary.context.response_status,
            "encoding probe: stream done"
        );
        if self.config.debug_mode {
            tracing::warn!(
                body_chunks = summary.body_chunks,
                body_bytes = summary.body_bytes,
                "encoding probe: summary callback={}",
                summary.callback_state()
            );
        }

        Some(summary)
    }

    fn expect_phase(&self, callback: &'static str, expected: ProbePhase) {
        if self.phase != expected {
            tracing::debug!(
                callback,
                phase = ?self.phase,
                expected = ?expected,
                "encoding probe: callback out of order"
            );
        }
    }
}

impl Drop for EncodingProbe {
    fn drop(&mut self) {
        self.on_stream_done();
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
