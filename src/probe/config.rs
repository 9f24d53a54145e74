//! Probe configuration.

use serde_json::Value;
use thiserror::Error;

use crate::config::ProbeSettings;

#[derive(Debug, Error)]
pub enum ProbeConfigError {
    #[error("probe config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("probe config must be a JSON object")]
    NotAnObject,
}

/// Probe behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Log every phase, not only the stream-done summary.
    pub debug_mode: bool,
}

impl ProbeConfig {
    /// Parse a host-supplied JSON document such as `{"debugMode": true}`.
    ///
    /// A missing or non-boolean `debugMode` reads as `false`.
    pub fn from_json(raw: &str) -> Result<Self, ProbeConfigError> {
        let value: Value = serde_json::from_str(raw)?;
        let object = value.as_object().ok_or(ProbeConfigError::NotAnObject)?;
        Ok(Self {
            debug_mode: object
                .get("debugMode")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

impl TryFrom<&ProbeSettings> for ProbeConfig {
    type Error = ProbeConfigError;

    /// The JSON document wins over the plain `debug_mode` switch when both are set.
    fn try_from(settings: &ProbeSettings) -> Result<Self, Self::Error> {
        match settings.config_json.as_deref() {
            Some(raw) => Self::from_json(raw),
            None => Ok(Self {
                debug_mode: settings.debug_mode,
            }),
        }
    }
}
