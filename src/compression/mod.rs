//! Forced gzip encoding of response bodies.
//!
//! # Data Flow
//! ```text
//! producer bytes
//!     → session.rs (gzip encoder, fastest level; sync flush on demand)
//!     → sink.rs   (staging buffer; transport flush hands a chunk to the body)
//!     → axum Body → connection
//! ```
//!
//! # Design Decisions
//! - Gzip is applied unconditionally; `Accept-Encoding` is never consulted
//! - Compressor flush and transport flush are separate calls on separate layers
//! - A session owns its sink, so a sink never outlives or escapes its request

pub mod session;
pub mod sink;

pub use session::{CompressionSession, SessionError};
pub use sink::{BufferedSink, ChannelSink, ResponseSink};
