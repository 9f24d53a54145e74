//! Gzip compression session over a response sink.
//!
//! A session is opened once per response. Opening stamps the encoding
//! headers; after that every byte goes through a fastest-level gzip encoder
//! whose sync flush is exposed separately from the sink's transport flush.

use std::io::Write;

use axum::http::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE, VARY};
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::compression::sink::ResponseSink;

/// Failure inside a compression session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("write through gzip encoder failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("gzip flush failed: {0}")]
    Flush(#[source] std::io::Error),

    #[error("finalizing gzip stream failed: {0}")]
    Close(#[source] std::io::Error),

    #[error("session already failed")]
    Poisoned,

    #[error("session already finished")]
    Finished,
}

/// Per-response gzip encoder that owns its sink.
///
/// Dropping a session without [`close`](Self::close) still finalizes the gzip
/// trailer into the sink; `close` is the path that reports the outcome.
pub struct CompressionSession<S: ResponseSink> {
    encoder: GzEncoder<S>,
    poisoned: bool,
    finished: bool,
}

impl<S: ResponseSink> CompressionSession<S> {
    /// Set `Content-Type`, `Content-Encoding: gzip` and `Vary: Accept-Encoding`
    /// on `headers` and start compressing into `sink`.
    ///
    /// The request's `Accept-Encoding` is never consulted.
    pub fn open(sink: S, content_type: &'static str, headers: &mut HeaderMap) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));

        Self {
            encoder: GzEncoder::new(sink, Compression::fast()),
            poisoned: false,
            finished: false,
        }
    }

    /// Feed `bytes` to the compressor.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.check()?;
        self.encoder.write_all(bytes).map_err(|e| {
            self.poisoned = true;
            SessionError::Write(e)
        })
    }

    /// Force everything the compressor holds into the sink (gzip sync flush)
    /// without ending the stream.
    pub fn flush(&mut self) -> Result<(), SessionError> {
        self.check()?;
        self.encoder.flush().map_err(|e| {
            self.poisoned = true;
            SessionError::Flush(e)
        })
    }

    /// Sink below the compressor, for transport-level operations.
    pub fn sink(&self) -> &S {
        self.encoder.get_ref()
    }

    /// Mutable sink below the compressor, for transport-level operations.
    pub fn sink_mut(&mut self) -> &mut S {
        self.encoder.get_mut()
    }

    /// Record a failure that happened below the session (e.g. a transport
    /// flush) so later session calls refuse to write.
    pub fn poison(&mut self) {
        self.poisoned = true;
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Write the gzip trailer into the sink, keeping the sink in place for a
    /// final transport flush. Later writes are refused.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        self.check()?;
        self.finished = true;
        self.encoder.try_finish().map_err(|e| {
            self.poisoned = true;
            SessionError::Close(e)
        })
    }

    /// Write the gzip trailer and hand back the sink.
    pub fn close(self) -> Result<S, SessionError> {
        if self.poisoned {
            return Err(SessionError::Poisoned);
        }
        self.encoder.finish().map_err(SessionError::Close)
    }

    fn check(&self) -> Result<(), SessionError> {
        if self.poisoned {
            Err(SessionError::Poisoned)
        } else if self.finished {
            Err(SessionError::Finished)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::sink::BufferedSink;
    use flate2::read::GzDecoder;
    use std::io::{self, Read};

    fn gunzip(bytes: &[u8]) -> String {
        let mut text = String::new();
        GzDecoder::new(bytes).read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn open_sets_encoding_headers() {
        let mut headers = HeaderMap::new();
        let _session = CompressionSession::open(BufferedSink::new(), "text/plain", &mut headers);

        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[CONTENT_ENCODING], "gzip");
        assert_eq!(headers[VARY], "Accept-Encoding");
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn close_produces_complete_gzip() {
        let mut headers = HeaderMap::new();
        let mut session = CompressionSession::open(BufferedSink::new(), "text/plain", &mut headers);
        session.write(b"hello ").unwrap();
        session.write(b"world").unwrap();

        let body = session.close().unwrap().into_inner();
        assert_eq!(&body[..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&body), "hello world");
    }

    #[test]
    fn flush_makes_written_bytes_decodable() {
        let mut headers = HeaderMap::new();
        let mut session = CompressionSession::open(BufferedSink::new(), "text/plain", &mut headers);
        session.write(b"data: 1\n\n").unwrap();
        session.flush().unwrap();

        // Without a trailer the stream is incomplete, but a sync flush has
        // already pushed every byte of the frame into the sink.
        let partial = session.sink().as_bytes().to_vec();
        let mut decoded = Vec::new();
        let _ = GzDecoder::new(&partial[..]).read_to_end(&mut decoded);
        assert_eq!(decoded, b"data: 1\n\n");
    }

    #[test]
    fn finish_keeps_sink_and_refuses_writes() {
        let mut headers = HeaderMap::new();
        let mut session = CompressionSession::open(BufferedSink::new(), "text/plain", &mut headers);
        session.write(b"last words").unwrap();
        session.finish().unwrap();

        assert!(matches!(session.write(b"more"), Err(SessionError::Finished)));
        assert_eq!(gunzip(session.sink().as_bytes()), "last words");
    }

    #[test]
    fn dropped_session_still_finishes_stream() {
        let mut headers = HeaderMap::new();
        let shared = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        {
            let mut session = CompressionSession::open(
                SharedSink(shared.clone()),
                "text/plain",
                &mut headers,
            );
            session.write(b"early exit").unwrap();
        }
        let body = shared.lock().unwrap().clone();
        assert_eq!(gunzip(&body), "early exit");
    }

    #[test]
    fn failed_write_poisons_session() {
        let mut headers = HeaderMap::new();
        let mut session = CompressionSession::open(FailingSink, "text/plain", &mut headers);
        session.write(&[7u8; 64 * 1024]).ok();
        let err = session.flush().unwrap_err();
        assert!(matches!(err, SessionError::Flush(_) | SessionError::Poisoned));
        assert!(session.is_poisoned());
        assert!(matches!(session.write(b"x"), Err(SessionError::Poisoned)));
    }

    struct SharedSink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ResponseSink for SharedSink {
        fn supports_flush(&self) -> bool {
            true
        }

        async fn flush_transport(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
        }
    }

    impl ResponseSink for FailingSink {
        fn supports_flush(&self) -> bool {
            true
        }

        async fn flush_transport(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
        }
    }
}
