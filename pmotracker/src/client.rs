//! HTTP client for the phone lookup backend

use crate::error::{Error, Result};
use crate::models::{
    HealthStatus, MAP_PATH_PREFIX, TrackRequest, TrackResult, ValidateRequest, ValidateResult,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default backend base URL
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "pmotracker/0.1.0";

/// The two lookup operations the form relies on.
///
/// The controller only talks to the backend through this trait, so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait LookupService: Send + Sync {
    /// Look up a number's metadata (`POST /track`)
    async fn track(&self, request: &TrackRequest) -> Result<TrackResult>;

    /// Quick validity check (`POST /validate`)
    async fn validate(&self, request: &ValidateRequest) -> Result<ValidateResult>;
}

/// Lookup backend HTTP client
///
/// # Example
///
/// ```no_run
/// use pmotracker::{LookupClient, LookupService, TrackRequest, TrackResult};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = LookupClient::builder()
///         .api_base("http://localhost:5000")
///         .build()?;
///
///     match client.track(&TrackRequest::new("+14155552671")?).await? {
///         TrackResult::Success(info) => println!("{} ({})", info.country, info.carrier),
///         TrackResult::Failure { error } => println!("failed: {:?}", error),
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: Client,
    api_base: String,
    request_timeout: Option<Duration>,
}

impl LookupClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Base URL of the backend, without trailing slash
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Absolute URL of a map resource
    pub fn map_url(&self, map_file: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}{}{}",
            self.api_base, MAP_PATH_PREFIX, map_file
        ))?)
    }

    /// Probe `GET /health`
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("health")?;
        let mut request = self.client.get(url);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Error::other(format!(
                "Health check returned status: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.api_base, name))?)
    }

    /// POST a JSON body and decode the JSON answer.
    ///
    /// The status code is not checked: the backend reports rejected
    /// numbers with 4xx/5xx and a regular JSON body.
    async fn post_json<B, T>(&self, name: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(name)?;
        debug!(%url, "POST");

        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(endpoint = name, %status, len = bytes.len(), "Response received");
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl LookupService for LookupClient {
    async fn track(&self, request: &TrackRequest) -> Result<TrackResult> {
        self.post_json("track", request).await
    }

    async fn validate(&self, request: &ValidateRequest) -> Result<ValidateResult> {
        self.post_json("validate", request).await
    }
}

/// Builder for configuring a LookupClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    request_timeout: Option<Duration>,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Use a custom reqwest::Client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the backend base URL (a trailing slash is ignored)
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout. Calls never time out when unset.
    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<LookupClient> {
        // Reject unusable bases early rather than on the first call
        Url::parse(&self.api_base)?;

        let client = match self.client {
            Some(c) => c,
            None => Client::builder().user_agent(&self.user_agent).build()?,
        };

        Ok(LookupClient {
            client,
            api_base: self.api_base,
            request_timeout: self.request_timeout,
        })
    }
}
