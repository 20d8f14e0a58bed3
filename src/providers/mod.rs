// LLM provider gateway
//
// The endpoint talks to providers only through the `LlmProvider` trait so
// the HTTP layer can be exercised with an in-process stub.

use async_trait::async_trait;

mod error;
pub mod openai;
pub mod types;

pub use error::GatewayError;
pub use openai::OpenAIProvider;
pub use types::{extract_answer, Completion, CompletionRequest, ContentPart, MessageContent};

use crate::chat::ChatMessage;

/// A chat completions backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai")
    fn name(&self) -> &str;

    /// Model requested on every call
    fn model(&self) -> &str;

    /// Send the conversation once and extract the answer text.
    ///
    /// `api_key` is passed per call because it is re-read for every request.
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, GatewayError>;
}
