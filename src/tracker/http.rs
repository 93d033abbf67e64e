//! Blocking JSON-over-HTTP client for a remote tracking service.
//!
//! Endpoints, relative to `{base_url}/api/{entity}/{project}/runs`:
//!
//! | Call           | Request                          | Body                      |
//! |----------------|----------------------------------|---------------------------|
//! | `init`         | `POST /`                         | [`RunRecord`]             |
//! | `log`          | `POST /{run_id}/history`         | [`MetricRecord`]          |
//! | `log_artifact` | `POST /{run_id}/artifacts`       | [`ArtifactRecord`]        |
//! | `finish`       | `POST /{run_id}/finish`          | `{"run": .., "summary": ..}` |
//!
//! Entity, project and run ID are percent-encoded as single path segments.
//!
//! Any transport error or non-2xx status is returned as
//! [`crate::Error::Http`]. Nothing is buffered or retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use ureq::Agent;

use super::Tracker;
use crate::experiment::{ArtifactRecord, MetricRecord, RunRecord};
use crate::{Error, Result};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Connection settings for [`HttpTracker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpTrackerConfig {
    base_url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

impl HttpTrackerConfig {
    /// Create a builder for the service at `base_url`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> HttpTrackerConfigBuilder {
        HttpTrackerConfigBuilder::new(base_url)
    }

    /// Parse settings from JSON, e.g.
    /// `{"base_url": "https://track.example.com", "api_key": "..."}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON or missing fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Service base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Bearer token, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Builder for `HttpTrackerConfig`.
#[derive(Debug)]
pub struct HttpTrackerConfigBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl HttpTrackerConfigBuilder {
    /// Create a builder with the default 30 second timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Authenticate with a bearer token.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout (millisecond resolution).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Build the `HttpTrackerConfig`.
    #[must_use]
    pub fn build(self) -> HttpTrackerConfig {
        HttpTrackerConfig {
            base_url: self.base_url,
            api_key: self.api_key,
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Tracker that forwards every call to a remote service.
pub struct HttpTracker {
    agent: Agent,
    config: HttpTrackerConfig,
    run_url: Option<String>,
}

impl HttpTracker {
    /// Create a client; no request is made until [`Tracker::init`].
    #[must_use]
    pub fn new(config: HttpTrackerConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build();
        Self {
            agent: Agent::new_with_config(agent_config),
            config,
            run_url: None,
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn config(&self) -> &HttpTrackerConfig {
        &self.config
    }

    fn runs_url(&self, run: &RunRecord) -> String {
        format!(
            "{}/api/{}/{}/runs",
            self.config.base_url(),
            urlencoding::encode(run.entity()),
            urlencoding::encode(run.project())
        )
    }

    fn run_url(&self) -> Result<&str> {
        self.run_url
            .as_deref()
            .ok_or_else(|| Error::Other("HTTP tracker used before init".to_string()))
    }

    fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        debug!(url, "posting to tracking service");
        let mut request = self.agent.post(url);
        if let Some(key) = self.config.api_key() {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        request.send_json(body)?;
        Ok(())
    }
}

impl Tracker for HttpTracker {
    fn init(&mut self, run: &RunRecord) -> Result<()> {
        let runs_url = self.runs_url(run);
        self.post(&runs_url, run)?;
        self.run_url = Some(format!("{runs_url}/{}", urlencoding::encode(run.run_id())));
        Ok(())
    }

    fn log(&mut self, metric: &MetricRecord) -> Result<()> {
        let url = format!("{}/history", self.run_url()?);
        self.post(&url, metric)
    }

    fn log_artifact(&mut self, artifact: &ArtifactRecord) -> Result<()> {
        let url = format!("{}/artifacts", self.run_url()?);
        self.post(&url, artifact)
    }

    fn finish(&mut self, run: &RunRecord, summary: &serde_json::Value) -> Result<()> {
        let url = format!("{}/finish", self.run_url()?);
        self.post(&url, &json!({ "run": run, "summary": summary }))
    }
}
