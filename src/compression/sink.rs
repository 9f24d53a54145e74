//! Response sinks a compression session writes into.
//!
//! A sink has two buffering layers of its own: bytes written through
//! [`Write`] are only staged, and [`ResponseSink::flush_transport`] hands the
//! staged bytes to the connection as one body chunk. Sinks that cannot push
//! bytes before the body ends report it through `supports_flush`.

use std::future::Future;
use std::io::{self, Write};

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

/// Byte sink backing one response body.
pub trait ResponseSink: Write + Send {
    /// Whether staged bytes can reach the network before the body ends.
    fn supports_flush(&self) -> bool;

    /// Deliver every staged byte to the connection as one body chunk.
    fn flush_transport(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Bytes handed to the connection so far. Sinks that only deliver once
    /// the body ends report 0.
    fn bytes_sent(&self) -> u64 {
        0
    }
}

type BodyChunk = Result<Bytes, io::Error>;

/// Streaming sink feeding an axum [`Body`] through a bounded channel.
///
/// The channel bound is the backpressure point: `flush_transport` waits while
/// the connection is behind, and fails once the body has been dropped.
pub struct ChannelSink {
    staged: BytesMut,
    tx: mpsc::Sender<BodyChunk>,
    closed: bool,
    bytes_sent: u64,
}

impl ChannelSink {
    /// Create a sink and the response body it feeds.
    pub fn new(capacity: usize) -> (Self, Body) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        });

        let sink = Self {
            staged: BytesMut::new(),
            tx,
            closed: false,
            bytes_sent: 0,
        };
        (sink, Body::from_stream(stream))
    }

    fn gone() -> io::Error {
        io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped by client")
    }
}

impl Write for ChannelSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Self::gone());
        }
        self.staged.extend_from_slice(buf);
        Ok(buf.len())
    }

    // Staging has nothing below it to flush; delivery is `flush_transport`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for ChannelSink {
    fn supports_flush(&self) -> bool {
        true
    }

    async fn flush_transport(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(Self::gone());
        }
        if self.staged.is_empty() {
            return Ok(());
        }

        let chunk = self.staged.split().freeze();
        let len = chunk.len() as u64;
        if self.tx.send(Ok(chunk)).await.is_err() {
            self.closed = true;
            return Err(Self::gone());
        }
        self.bytes_sent += len;
        Ok(())
    }

    fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}

impl Drop for ChannelSink {
    fn drop(&mut self) {
        // Bytes staged by a late close (e.g. the gzip trailer written when an
        // encoder is dropped) still go out if the body is alive.
        if !self.closed && !self.staged.is_empty() {
            let _ = self.tx.try_send(Ok(self.staged.split().freeze()));
        }
    }
}

/// Sink that keeps the whole body in memory until the handler returns.
#[derive(Debug, Default)]
pub struct BufferedSink {
    buf: Vec<u8>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for BufferedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for BufferedSink {
    fn supports_flush(&self) -> bool {
        false
    }

    async fn flush_transport(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "buffered sink cannot flush before the body ends",
        ))
    }
}
