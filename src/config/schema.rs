//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the upstream.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Port used when neither the config file nor `PORT` provides one.
pub const DEFAULT_PORT: u16 = 18080;

/// Root configuration for the upstream server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Streaming response settings.
    pub stream: StreamConfig,

    /// In-process encoding probe settings.
    pub probe: ProbeSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` form accepted by `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Streaming response settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Body chunks that may queue between the emitter and the connection
    /// before the emitter waits for the client to catch up.
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
        }
    }
}

/// Encoding probe settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Run the probe around every response.
    pub enabled: bool,

    /// Log every phase, not only the stream-done summary.
    pub debug_mode: bool,

    /// Probe config as a JSON document (`{"debugMode": true}`). Takes the
    /// place of `debug_mode` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_json: Option<String>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debug_mode: false,
            config_json: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
