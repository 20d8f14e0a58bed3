// Gateway failure taxonomy

use thiserror::Error;

/// Why a provider call produced no answer.
///
/// Messages never include the credential; they are safe to log.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Could not connect, timed out, DNS failure, body read failure
    #[error("OpenAI API の呼び出しに失敗しました: {0}")]
    Transport(String),

    /// Response body was not a JSON object
    #[error("OpenAI API のレスポンスが解析できませんでした (status {status})")]
    ResponseFormat { status: u16 },

    /// Provider answered with status >= 400
    #[error("OpenAI API エラー (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Successful response without any usable text
    #[error("OpenAI API から有効な回答が得られませんでした")]
    EmptyAnswer,
}

impl GatewayError {
    /// Stable class name used in logs and the optional `details` field.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "TransportError",
            GatewayError::ResponseFormat { .. } => "ResponseFormatError",
            GatewayError::Provider { .. } => "ProviderError",
            GatewayError::EmptyAnswer => "EmptyAnswerError",
        }
    }

    /// `"<class>: <message>"`
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        let detail = if e.is_timeout() {
            format!("request timed out ({e})")
        } else {
            e.to_string()
        };
        GatewayError::Transport(detail)
    }
}
