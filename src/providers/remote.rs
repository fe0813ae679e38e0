//! Client for an OpenAI-compatible chat completions endpoint.
//!
//! The service is asked for a single JSON object (`response_format:
//! json_object`) and the first choice's message content is handed to
//! [`parse_terms`](super::prompt::parse_terms).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompt::{parse_terms, system_instructions};
use super::traits::RemoteInference;
use crate::types::ParsedTerms;
use crate::{Result, ShotTermsError};

/// Default base URL for the remote inference service.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model requested from the remote service.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.1;

/// Configuration for the remote inference service.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Bearer credential. Without one, every remote call fails.
    pub service_credential: Option<String>,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Upper bound on one remote call. Default: 30s.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            service_credential: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RemoteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_credential(mut self, credential: impl Into<String>) -> Self {
        self.service_credential = Some(credential.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// credential stays out of logs
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field(
                "service_credential",
                &self.service_credential.as_ref().map(|_| "<redacted>"),
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Remote inference over the chat completions API.
#[derive(Clone)]
pub struct RemoteClient {
    credential: Option<String>,
    http: Client,
    base_url: String,
    model: String,
}

impl RemoteClient {
    /// Create a client from configuration.
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            credential: config.service_credential.clone(),
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(credential: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::new(
            &RemoteConfig::new()
                .service_credential(credential)
                .base_url(base_url),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, text: &str) -> Result<String> {
        let credential = self.credential.as_deref().ok_or_else(|| {
            ShotTermsError::ServiceUnavailable("no service credential configured".to_string())
        })?;
        let url = format!("{}/chat/completions", self.base_url);
        let instructions = system_instructions();

        let response = self
            .http
            .post(&url)
            .bearer_auth(credential)
            .json(&ChatRequest {
                model: &self.model,
                temperature: TEMPERATURE,
                response_format: ResponseFormat {
                    kind: "json_object",
                },
                messages: [
                    ChatMessage {
                        role: "system",
                        content: &instructions,
                    },
                    ChatMessage {
                        role: "user",
                        content: text,
                    },
                ],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShotTermsError::ServiceUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let body = response.text().await?;
        let completion: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            ShotTermsError::MalformedResponse(format!("unexpected completion body: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ShotTermsError::MalformedResponse("completion has no message content".to_string())
            })
    }
}

#[async_trait]
impl RemoteInference for RemoteClient {
    fn name(&self) -> &str {
        "remote"
    }

    async fn parse(&self, text: &str) -> Result<ParsedTerms> {
        let content = self.complete(text).await?;
        debug!(model = %self.model, bytes = content.len(), "remote completion received");
        parse_terms(&content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
