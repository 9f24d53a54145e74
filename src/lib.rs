//! Synthetic upstream that always gzip-encodes its responses.

pub mod compression;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod stream;

pub use config::schema::UpstreamConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
