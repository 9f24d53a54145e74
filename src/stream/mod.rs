//! Server-sent event streaming.
//!
//! # Data Flow
//! ```text
//! query string
//!     → params.rs (ResponseConfig, clamped)
//!     → emitter.rs (frames → compression session → transport, timed)
//!     → frame.rs (event line formatting, sentinel)
//! ```

pub mod emitter;
pub mod frame;
pub mod params;

pub use emitter::{EmitReport, EmitterState, SseEmitter, StreamError};
pub use frame::{Frame, SENTINEL};
pub use params::{ResponseConfig, StreamQuery};
