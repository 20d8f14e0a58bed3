// HTTP client for the chat endpoint

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::chat::{ChatReply, ChatRequest};

/// Shown when the server reports a failure without a message.
pub const GENERIC_FAILURE: &str = "エラーが発生しました。時間をおいて再度お試しください。";

/// Shown when no usable reply arrived. The cause is logged, not displayed.
pub const NETWORK_FAILURE: &str = "通信に失敗しました。ネットワーク環境を確認してください。";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx status, or an `error` field in the body
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Request never completed
    #[error("{}", NETWORK_FAILURE)]
    Network(String),

    /// 2xx body that is not a reply envelope
    #[error("{}", NETWORK_FAILURE)]
    Malformed(String),
}

/// Client for a running tutor server.
#[derive(Clone)]
pub struct TutorClient {
    client: Client,
    base_url: String,
}

impl TutorClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        // Above the server's own provider timeout so its 500 reaches us first.
        let client = Client::builder()
            .timeout(Duration::from_secs(45))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask one question.
    ///
    /// Failure is either a non-2xx status or a truthy `error` field; both
    /// are checked because a 200 carrying `error` is still a failure.
    pub async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let raw = response.text().await.map_err(network_error)?;
        // A non-JSON error page still counts as a server failure below.
        let body = serde_json::from_str(&raw).unwrap_or(Value::Null);

        interpret_reply(status.as_u16(), body).map_err(|e| {
            match &e {
                ClientError::Malformed(cause) => {
                    tracing::warn!(status = status.as_u16(), "Unreadable reply: {}", cause)
                }
                ClientError::Server {
                    details: Some(details),
                    ..
                } => tracing::warn!(status = status.as_u16(), "Server failure: {}", details),
                _ => {}
            }
            e
        })
    }
}

fn network_error(e: reqwest::Error) -> ClientError {
    tracing::warn!("Request to tutor server failed: {}", e);
    ClientError::Network(e.to_string())
}

/// Turn a status and decoded body into a reply or a failure.
pub fn interpret_reply(status: u16, body: Value) -> Result<ChatReply, ClientError> {
    let error = body.get("error").filter(|e| is_truthy(e));

    if !(200..300).contains(&status) || error.is_some() {
        let message = error
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE)
            .to_string();
        let details = body
            .get("details")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(ClientError::Server {
            status,
            message,
            details,
        });
    }

    serde_json::from_value(body).map_err(|e| ClientError::Malformed(e.to_string()))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}
