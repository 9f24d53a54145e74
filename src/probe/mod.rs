//! Content-encoding probe.
//!
//! Records what an intermediary sees of a response: the client's
//! `Accept-Encoding`, the upstream's `Content-Encoding` and status, and
//! whether a body-chunk callback ever ran. The host calls into the probe at
//! phase boundaries and the probe never alters the bytes passing through.
//!
//! # Phases
//! ```text
//! AwaitingRequest ─on_request_headers→ AwaitingResponse
//!     ─on_response_headers→ Streaming ─on_body_chunk*→ Streaming
//!     ─on_stream_done→ Done
//! ```

pub mod config;
pub mod filter;

pub use config::{ProbeConfig, ProbeConfigError};
pub use filter::{EncodingProbe, ProbeContext, ProbePhase, ProbeSummary};
