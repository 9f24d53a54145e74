//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, channel capacity)
//! - Validate addresses and the probe JSON document, which are only parsed
//!   later at startup
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: UpstreamConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::UpstreamConfig;
use crate::probe::ProbeConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("PORT environment value {0:?} is not a valid port")]
    InvalidPortEnv(String),

    #[error("stream.channel_capacity must be at least 1")]
    ZeroChannelCapacity,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("probe.config_json is invalid: {0}")]
    InvalidProbeConfig(String),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &UpstreamConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.stream.channel_capacity == 0 {
        errors.push(ValidationError::ZeroChannelCapacity);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.probe.enabled {
        if let Err(e) = ProbeConfig::try_from(&config.probe) {
            errors.push(ValidationError::InvalidProbeConfig(e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&UpstreamConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = UpstreamConfig::default();
        config.listener.port = 0;
        config.stream.channel_capacity = 0;
        config.observability.log_level = "loud".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::ZeroChannelCapacity,
                ValidationError::UnknownLogLevel("loud".into()),
                ValidationError::InvalidMetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn malformed_probe_json_is_rejected() {
        let mut config = UpstreamConfig::default();
        config.probe.config_json = Some("[true]".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::InvalidProbeConfig(_)));

        config.probe.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn metrics_address_ignored_when_disabled() {
        let mut config = UpstreamConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
