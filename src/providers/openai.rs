// OpenAI chat completions gateway
//
// One attempt per question: no retries, fixed timeout. Every failure is
// surfaced as a typed GatewayError for the endpoint to wrap.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::error::GatewayError;
use super::types::{extract_answer, Completion, CompletionRequest};
use super::LlmProvider;
use crate::chat::ChatMessage;
use crate::config::OpenAiSettings;
use crate::logging::{LoggedRequest, LoggedResponse, PromptLog, PromptLogEntry};

/// Path appended to the configured base URL.
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// OpenAI chat completions provider
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
    max_completion_tokens: u32,
    prompt_log: Option<PromptLog>,
}

impl OpenAIProvider {
    /// Create a provider from settings. The HTTP client (and its timeout) is
    /// built once and reused for every request.
    pub fn new(settings: &OpenAiSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_completion_tokens: settings.max_completion_tokens,
            prompt_log: None,
        })
    }

    /// Record every successful exchange to `log`.
    pub fn with_prompt_log(mut self, log: PromptLog) -> Self {
        self.prompt_log = Some(log);
        self
    }

    fn build_request(&self, messages: &[ChatMessage]) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_completion_tokens: self.max_completion_tokens,
        }
    }

    /// Write the audit entry on the blocking pool; file locking must not
    /// stall an async worker.
    async fn audit(&self, request: CompletionRequest, completion: &Completion) {
        let Some(log) = self.prompt_log.clone() else {
            return;
        };
        let entry = PromptLogEntry::new(
            LoggedRequest {
                model: request.model,
                max_completion_tokens: request.max_completion_tokens,
                messages: request.messages,
            },
            LoggedResponse {
                answer: completion.answer.clone(),
                id: completion.id.clone(),
                usage: completion.usage.clone(),
            },
        );
        if let Err(e) = tokio::task::spawn_blocking(move || log.record(&entry)).await {
            tracing::warn!("Prompt audit task failed: {}", e);
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, GatewayError> {
        let request = self.build_request(messages);
        let url = format!("{}{}", self.base_url, COMPLETIONS_PATH);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        let decoded: Value = match serde_json::from_str(&raw) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                tracing::warn!(status = status.as_u16(), "Unparseable provider response");
                return Err(GatewayError::ResponseFormat {
                    status: status.as_u16(),
                });
            }
        };

        if status.as_u16() >= 400 {
            let message = decoded
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unexpected error")
                .to_string();
            return Err(GatewayError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let answer = extract_answer(&decoded).ok_or(GatewayError::EmptyAnswer)?;

        let completion = Completion {
            answer,
            id: decoded.get("id").and_then(Value::as_str).map(str::to_string),
            usage: decoded.get("usage").cloned(),
        };

        tracing::debug!(id = ?completion.id, "Received chat completion");

        self.audit(request, &completion).await;

        Ok(completion)
    }
}
