//! Hosts an [`EncodingProbe`] around every response.
//!
//! The middleware plays the intermediary: it calls the probe with the request
//! headers, then the response headers, then once per body frame as the
//! connection pulls it. The body keeps its frame boundaries and size hint,
//! so chunk timing and `Content-Length` are unaffected.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};

use crate::probe::{EncodingProbe, ProbeConfig};

pub async fn encoding_probe(
    State(config): State<ProbeConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut probe = EncodingProbe::new(config);
    probe.on_request_headers(request.headers());

    let response = next.run(request).await;
    probe.on_response_headers(response.status(), response.headers());

    let (parts, body) = response.into_parts();
    Response::from_parts(
        parts,
        Body::new(ObservedBody {
            inner: body,
            probe: Some(probe),
        }),
    )
}

/// Body wrapper feeding every data frame to the probe.
struct ObservedBody {
    inner: Body,
    probe: Option<EncodingProbe>,
}

impl HttpBody for ObservedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                let end_of_stream = this.inner.is_end_stream();
                if let (Some(data), Some(probe)) = (frame.data_ref(), this.probe.as_mut()) {
                    probe.on_body_chunk(data, end_of_stream);
                }
                if end_of_stream {
                    this.finish();
                }
            }
            Poll::Ready(Some(Err(_))) => this.finish(),
            Poll::Ready(None) => {
                if let Some(probe) = this.probe.as_mut() {
                    probe.on_body_chunk(&[], true);
                }
                this.finish();
            }
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl ObservedBody {
    fn finish(&mut self) {
        if let Some(mut probe) = self.probe.take() {
            probe.on_stream_done();
        }
    }
}
