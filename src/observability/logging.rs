//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the filter: `RUST_LOG` when set, otherwise the configured level
//!
//! # Design Decisions
//! - The configured level applies to this crate and `tower_http` only, so
//!   dependencies stay quiet unless `RUST_LOG` asks for them

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Directive used when `RUST_LOG` is absent or invalid.
pub fn default_directive(level: &str) -> String {
    format!("force_gzip_upstream={level},tower_http={level}")
}

/// Build the filter for `config`.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)))
}

/// Install the global subscriber. Returns `false` when one is already set.
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
