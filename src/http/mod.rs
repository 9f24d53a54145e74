//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → middleware/observer.rs (request log)
//!     → middleware/probe.rs (encoding probe around the response)
//!     → handlers.rs (healthz, gzip JSON, gzip SSE)
//!     → response.rs / stream::emitter (compressed body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
