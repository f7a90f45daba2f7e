//! Service configuration with TOML file support.

use kyc_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for [`crate::VerificationService`].
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// How long after start a session expires.
    #[serde(default = "default_session_expiry_secs")]
    pub session_expiry_secs: u64,

    /// Delay before a document's processing outcome is recorded.
    #[serde(default = "default_document_delay_ms")]
    pub document_processing_delay_ms: u64,

    /// Delay before a biometric's processing outcome is recorded.
    #[serde(default = "default_biometric_delay_ms")]
    pub biometric_processing_delay_ms: u64,

    /// Documents scoring above this confidence are verified.
    #[serde(default = "default_threshold")]
    pub document_confidence_threshold: f64,

    /// Biometrics scoring above this confidence are verified.
    #[serde(default = "default_threshold")]
    pub biometric_confidence_threshold: f64,

    /// Largest biometric payload accepted at intake.
    #[serde(default = "default_max_biometric_bytes")]
    pub max_biometric_bytes: u64,

    /// Events kept for `drain_events` before the oldest are dropped.
    #[serde(default = "default_max_pending_events")]
    pub max_pending_events: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_session_expiry_secs() -> u64 {
    24 * 60 * 60
}

fn default_document_delay_ms() -> u64 {
    3_000
}

fn default_biometric_delay_ms() -> u64 {
    2_000
}

fn default_threshold() -> f64 {
    0.8
}

fn default_max_biometric_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_max_pending_events() -> usize {
    10_000
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("document_confidence_threshold", self.document_confidence_threshold),
            ("biometric_confidence_threshold", self.biometric_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.max_pending_events == 0 {
            return Err(ConfigError::Invalid(
                "max_pending_events must be positive".into(),
            ));
        }
        if self.session_expiry_secs == 0 {
            return Err(ConfigError::Invalid(
                "session_expiry_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn document_processing_delay(&self) -> Duration {
        Duration::from_millis(self.document_processing_delay_ms)
    }

    pub fn biometric_processing_delay(&self) -> Duration {
        Duration::from_millis(self.biometric_processing_delay_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            session_expiry_secs: default_session_expiry_secs(),
            document_processing_delay_ms: default_document_delay_ms(),
            biometric_processing_delay_ms: default_biometric_delay_ms(),
            document_confidence_threshold: default_threshold(),
            biometric_confidence_threshold: default_threshold(),
            max_biometric_bytes: default_max_biometric_bytes(),
            max_pending_events: default_max_pending_events(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ServiceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.session_expiry_secs, 86_400);
        assert_eq!(config.document_processing_delay(), Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            document_processing_delay_ms = 10
            log_format = "json"
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.document_processing_delay_ms, 10);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.biometric_processing_delay_ms, 2_000);
    }

    #[test]
    fn zero_event_capacity_is_rejected() {
        let err = ServiceConfig::from_toml_str("max_pending_events = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = ServiceConfig::from_toml_str("document_confidence_threshold = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session_expiry_secs = 600").unwrap();
        let config = ServiceConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.session_expiry_secs, 600);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServiceConfig::from_toml_file("/nonexistent/kyc.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
