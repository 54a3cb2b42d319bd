// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion backends behind the embedded and remote tiers.
//!
//! The tiers only need "prompt in, text out". [`HttpCompletionBackend`]
//! provides that over the OpenAI-compatible chat completions protocol, which
//! local inference servers and hosted assistants both speak.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use switchyard_config::model::CompletionConfig;
use switchyard_core::{SwitchyardError, TierId};
use tracing::debug;

/// A two-part prompt: fixed instructions plus the request itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
}

/// Turns a prompt into raw model output.
#[async_trait]
pub trait CompletionBackend: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, SwitchyardError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/v1/chat/completions` client.
#[derive(Debug, Clone)]
pub struct HttpCompletionBackend {
    tier: TierId,
    client: reqwest::Client,
    url: String,
    model: String,
}

impl HttpCompletionBackend {
    /// Build a client for `tier` from its endpoint settings.
    ///
    /// Fails with a config error when no endpoint is set.
    pub fn new(tier: TierId, config: &CompletionConfig) -> Result<Self, SwitchyardError> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            SwitchyardError::Config(format!("tier {tier} has no completion endpoint"))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                SwitchyardError::Config(format!("invalid API key header value: {e}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| SwitchyardError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            tier,
            client,
            url: format!("{}/v1/chat/completions", endpoint.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    fn unavailable(&self, message: String) -> SwitchyardError {
        SwitchyardError::TierUnavailable {
            tier: self.tier,
            message,
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, SwitchyardError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.unavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        debug!(tier = %self.tier, status = %status, "completion response received");
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.unavailable(format!("endpoint returned {status}: {text}")));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| SwitchyardError::ParseError {
            tier: self.tier,
            message: format!("unreadable completion response: {e}"),
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SwitchyardError::ParseError {
                tier: self.tier,
                message: "completion response has no content".into(),
            })
    }
}
