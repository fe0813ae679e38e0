//! Liveness probe for an inference server on the local machine.
//!
//! The probe follows the Ollama convention (`GET /api/tags`). Parsing through
//! the local server is not wired up, so [`LocalProbe::parse`] always fails and
//! routing falls through to the remote service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::LocalInference;
use crate::types::ParsedTerms;
use crate::{Result, ShotTermsError};

/// Default base URL of the local inference server.
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:11434";

/// Configuration for the local inference backend.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub base_url: String,
    /// Upper bound on the liveness probe. Default: 2s.
    pub probe_timeout: Duration,
    /// Upper bound on one local parse. Default: 10s.
    pub timeout: Duration,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOCAL_URL.to_string(),
            probe_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

impl LocalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stock local backend: probes liveness, cannot parse.
#[derive(Clone)]
pub struct LocalProbe {
    http: Client,
    base_url: String,
    probe_timeout: Duration,
}

impl LocalProbe {
    pub fn new(config: &LocalConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout,
        }
    }

    /// Create a probe against a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(&LocalConfig::new().base_url(base_url))
    }
}

#[async_trait]
impl LocalInference for LocalProbe {
    fn name(&self) -> &str {
        "local"
    }

    async fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .http
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, url = %url, "local inference probe failed");
                false
            }
        }
    }

    async fn parse(&self, _text: &str) -> Result<ParsedTerms> {
        Err(ShotTermsError::ServiceUnavailable(
            "local inference parsing is not available".to_string(),
        ))
    }
}
