//! Timed, compressed SSE emission.
//!
//! # States
//! ```text
//! Init → Streaming(1..=N) → Terminating → Closed
//!   │          │                 │
//!   └──────────┴─────────────────┴──(write/flush failure)──→ Closed
//! ```
//!
//! Every frame is delivered with a double flush: the gzip sync flush pushes
//! compressor state into the sink, then the transport flush hands the sink's
//! staged bytes to the connection. A proxy that re-buffers compressed bodies
//! shows up as frames arriving together instead of `chunk_delay` apart.

use std::io;
use std::time::{Duration, Instant};

use axum::http::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONNECTION};
use thiserror::Error;

use crate::compression::{CompressionSession, ResponseSink, SessionError};
use crate::observability::metrics;
use crate::stream::frame::{Frame, SENTINEL_EVENT};
use crate::stream::params::ResponseConfig;

/// Content type of every SSE response.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream; charset=utf-8";

/// Where the emitter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Init,
    Streaming { index: u32 },
    Terminating,
    Closed,
}

/// Reasons a stream cannot start or stops early.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("response transport cannot flush incrementally")]
    TransportUnsupported,

    #[error("frame serialization failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("client went away: {0}")]
    ClientGone(#[source] io::Error),

    #[error("transport flush failed: {0}")]
    Transport(#[source] io::Error),
}

impl StreamError {
    fn from_transport(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => StreamError::ClientGone(err),
            _ => StreamError::Transport(err),
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            StreamError::TransportUnsupported => "transport_unsupported",
            StreamError::Encode(_) => "encode",
            StreamError::Session(_) => "session",
            StreamError::ClientGone(_) => "client_gone",
            StreamError::Transport(_) => "transport",
        }
    }
}

/// Outcome of one stream, for logging by the owner.
#[derive(Debug)]
pub struct EmitReport {
    /// Frames fully delivered (sentinel excluded).
    pub frames_sent: u32,
    /// Compressed bytes handed to the connection.
    pub bytes_sent: u64,
    /// Whether the sentinel went out.
    pub completed: bool,
    /// State the failure happened in, if any.
    pub failed_in: Option<EmitterState>,
    pub error: Option<StreamError>,
    pub elapsed: Duration,
}

/// Drives one SSE response from first frame to gzip trailer.
pub struct SseEmitter<S: ResponseSink> {
    session: CompressionSession<S>,
    config: ResponseConfig,
    state: EmitterState,
    frames_sent: u32,
}

impl<S: ResponseSink> SseEmitter<S> {
    /// Enter `Init`: refuse sinks without incremental flush, then set the
    /// streaming headers and open the compression session.
    ///
    /// On error `headers` is left untouched.
    pub fn start(sink: S, config: ResponseConfig, headers: &mut HeaderMap) -> Result<Self, StreamError> {
        if !sink.supports_flush() {
            return Err(StreamError::TransportUnsupported);
        }

        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
        let session = CompressionSession::open(sink, EVENT_STREAM_CONTENT_TYPE, headers);

        Ok(Self {
            session,
            config,
            state: EmitterState::Init,
            frames_sent: 0,
        })
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    /// Emit every frame and the sentinel, then close the session. Failures
    /// end the stream where it stands; nothing is retried.
    pub async fn run(mut self) -> EmitReport {
        let started = Instant::now();

        let streamed = self.stream_frames().await;
        let completed = streamed.is_ok();
        let failed_in = (!completed).then_some(self.state);
        let closed = self.close().await;

        EmitReport {
            frames_sent: self.frames_sent,
            bytes_sent: self.session.sink().bytes_sent(),
            completed,
            failed_in,
            error: streamed.err().or(closed.err()),
            elapsed: started.elapsed(),
        }
    }

    async fn stream_frames(&mut self) -> Result<(), StreamError> {
        let count = self.config.chunk_count;
        let delay = self.config.chunk_delay;

        for index in 1..=count {
            self.state = EmitterState::Streaming { index };
            let event = Frame::now(index).to_event()?;
            self.deliver(event.as_bytes()).await?;
            self.frames_sent = index;
            metrics::record_frame();
            tracing::trace!(index, "SSE frame delivered");

            if index < count && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        self.state = EmitterState::Terminating;
        self.deliver(SENTINEL_EVENT).await
    }

    /// Write one event and push it through both buffering layers.
    async fn deliver(&mut self, event: &[u8]) -> Result<(), StreamError> {
        self.session.write(event)?;
        self.session.flush()?;
        if let Err(e) = self.session.sink_mut().flush_transport().await {
            self.session.poison();
            return Err(StreamError::from_transport(e));
        }
        Ok(())
    }

    /// Enter `Closed`: finalize the gzip trailer and deliver it, unless an
    /// earlier failure already cut the stream.
    async fn close(&mut self) -> Result<(), StreamError> {
        self.state = EmitterState::Closed;
        if self.session.is_poisoned() {
            return Ok(());
        }

        self.session.finish()?;
        self.session
            .sink_mut()
            .flush_transport()
            .await
            .map_err(StreamError::from_transport)
    }
}
