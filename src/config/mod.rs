//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → config file (TOML, optional)
//!     → PORT environment override
//!     → validation.rs (semantic checks)
//!     → UpstreamConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the server runs with no file at all
//! - Per-request tuning (chunk count, delay) is query input, not config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ProbeSettings, StreamConfig, UpstreamConfig};
