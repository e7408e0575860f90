//! Extension pour intégrer le tracker dans pmoconfig
//!
//! Adds typed accessors for the `tracker` section of the configuration:
//!
//! ```yaml
//! tracker:
//!   api_base: http://localhost:5000
//!   request_timeout_secs: 0
//!   validate:
//!     debounce_ms: 500
//!     min_length: 5
//! ```

use crate::client::{DEFAULT_API_BASE, LookupClient};
use crate::validate::{DEFAULT_DEBOUNCE, DEFAULT_MIN_LENGTH, ValidateSettings};
use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::{Number, Value};
use std::time::Duration;

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Trait d'extension pour la configuration du tracker
pub trait TrackerConfigExt {
    /// Backend base URL (default: `http://localhost:5000`)
    fn get_tracker_api_base(&self) -> Result<String>;

    fn set_tracker_api_base(&self, base: String) -> Result<()>;

    /// Per-request timeout; `None` when configured as 0 (the default)
    fn get_tracker_request_timeout(&self) -> Result<Option<Duration>>;

    fn set_tracker_request_timeout(&self, timeout: Option<Duration>) -> Result<()>;

    /// Validation quiet period (default: 500 ms)
    fn get_tracker_debounce(&self) -> Result<Duration>;

    fn set_tracker_debounce(&self, debounce: Duration) -> Result<()>;

    /// Minimum trimmed length before validating (default: 5)
    fn get_tracker_min_length(&self) -> Result<usize>;

    fn set_tracker_min_length(&self, min_length: usize) -> Result<()>;

    /// Both validation parameters at once
    fn get_tracker_validate_settings(&self) -> Result<ValidateSettings> {
        Ok(ValidateSettings {
            debounce: self.get_tracker_debounce()?,
            min_length: self.get_tracker_min_length()?,
        })
    }
}

impl TrackerConfigExt for Config {
    fn get_tracker_api_base(&self) -> Result<String> {
        match self.get_value(&["tracker", "api_base"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(DEFAULT_API_BASE.to_string()),
        }
    }

    fn set_tracker_api_base(&self, base: String) -> Result<()> {
        self.set_value(&["tracker", "api_base"], Value::String(base))
    }

    fn get_tracker_request_timeout(&self) -> Result<Option<Duration>> {
        let secs = self
            .get_value(&["tracker", "request_timeout_secs"])
            .ok()
            .as_ref()
            .and_then(as_u64)
            .unwrap_or(0);
        Ok((secs > 0).then(|| Duration::from_secs(secs)))
    }

    fn set_tracker_request_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        let secs = timeout.map(|t| t.as_secs()).unwrap_or(0);
        self.set_value(
            &["tracker", "request_timeout_secs"],
            Value::Number(Number::from(secs)),
        )
    }

    fn get_tracker_debounce(&self) -> Result<Duration> {
        Ok(self
            .get_value(&["tracker", "validate", "debounce_ms"])
            .ok()
            .as_ref()
            .and_then(as_u64)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE))
    }

    fn set_tracker_debounce(&self, debounce: Duration) -> Result<()> {
        self.set_value(
            &["tracker", "validate", "debounce_ms"],
            Value::Number(Number::from(debounce.as_millis() as u64)),
        )
    }

    fn get_tracker_min_length(&self) -> Result<usize> {
        Ok(self
            .get_value(&["tracker", "validate", "min_length"])
            .ok()
            .as_ref()
            .and_then(as_u64)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MIN_LENGTH))
    }

    fn set_tracker_min_length(&self, min_length: usize) -> Result<()> {
        self.set_value(
            &["tracker", "validate", "min_length"],
            Value::Number(Number::from(min_length)),
        )
    }
}

/// Everything needed to start a form, read from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub api_base: String,
    pub request_timeout: Option<Duration>,
    pub validate: ValidateSettings,
}

impl TrackerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api_base: config.get_tracker_api_base()?,
            request_timeout: config.get_tracker_request_timeout()?,
            validate: config.get_tracker_validate_settings()?,
        })
    }

    /// HTTP client pointed at the configured backend
    pub fn build_client(&self) -> crate::Result<LookupClient> {
        LookupClient::builder()
            .api_base(self.api_base.clone())
            .request_timeout(self.request_timeout)
            .build()
    }
}
