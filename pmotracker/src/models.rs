//! Data models for the lookup backend's requests and responses

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Base path of the map resources served by the backend
pub const MAP_PATH_PREFIX: &str = "/map/";

/// Body of a `POST /track` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRequest {
    pub phone_number: String,
}

impl TrackRequest {
    /// Build a request from raw input.
    ///
    /// The number is trimmed; a blank input is rejected.
    pub fn new(raw: &str) -> Result<Self> {
        let phone_number = raw.trim();
        if phone_number.is_empty() {
            return Err(Error::EmptyPhoneNumber);
        }
        Ok(Self {
            phone_number: phone_number.to_string(),
        })
    }
}

/// Body of a `POST /validate` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateRequest {
    pub phone_number: String,
}

impl ValidateRequest {
    pub fn new(raw: &str) -> Self {
        Self {
            phone_number: raw.trim().to_string(),
        }
    }
}

/// Approximate coordinates of the number's country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub formatted: Option<String>,
}

/// Metadata of a successfully tracked number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Number in international format
    pub number: String,
    pub country: String,
    pub carrier: String,
    /// Dialling prefix, e.g. `+1`
    pub country_code: String,
    pub timezones: Vec<String>,
    /// Name of the generated map resource, if any
    #[serde(default)]
    pub map_file: Option<String>,
    #[serde(default)]
    pub national_number: Option<u64>,
    #[serde(default)]
    pub location: Option<Location>,
    /// Server-side lookup time (ISO-8601, kept verbatim)
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TrackInfo {
    /// Timezones as displayed: joined with `", "`
    pub fn timezone_label(&self) -> String {
        self.timezones.join(", ")
    }

    /// Path of the map resource (`/map/{map_file}`)
    pub fn map_path(&self) -> Option<String> {
        self.map_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| format!("{}{}", MAP_PATH_PREFIX, f))
    }
}

/// Outcome of a `/track` call as reported by the backend
///
/// The wire format is one flat object discriminated by its `success` flag;
/// when `success` is false or absent only `error` carries meaning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawTrackResponse")]
pub enum TrackResult {
    Success(TrackInfo),
    Failure { error: Option<String> },
}

#[derive(Deserialize)]
struct RawTrackResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawTrackResponse> for TrackResult {
    type Error = String;

    fn try_from(raw: RawTrackResponse) -> std::result::Result<Self, Self::Error> {
        if !raw.success {
            return Ok(TrackResult::Failure { error: raw.error });
        }
        let info: TrackInfo = serde_json::from_value(serde_json::Value::Object(raw.rest))
            .map_err(|e| format!("incomplete success payload: {e}"))?;
        Ok(TrackResult::Success(info))
    }
}

/// Answer of a `/validate` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResult {
    pub valid: bool,
    /// Backend explanation, logged only
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub api_configured: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
