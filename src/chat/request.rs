// Inbound chat request parsing and the success envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A question about one unit, plus the client-held conversation so far.
///
/// `history` stays untyped until [`crate::chat::parse_history`] filters it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub subject: String,
    pub unit: String,
    pub question: String,
    #[serde(default)]
    pub history: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Body is not valid JSON, or is a JSON scalar
    #[error("request body is not a JSON object")]
    Malformed,
    /// subject, unit or question empty after trimming
    #[error("subject, unit and question are required")]
    MissingFields,
}

impl ChatRequest {
    /// Parse and validate a raw request body.
    ///
    /// Scalar fields are coerced to strings and trimmed; an empty body or a
    /// JSON list is treated as an object with no fields.
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        let payload: Value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(body).map_err(|_| RequestError::Malformed)?
        };

        // A JSON list decodes fine but carries no named fields.
        let mut fields = match payload {
            Value::Object(fields) => fields,
            Value::Array(_) => return Err(RequestError::MissingFields),
            _ => return Err(RequestError::Malformed),
        };

        let field = |name: &str| {
            fields
                .get(name)
                .map(coerce_string)
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let question = field("question");
        let subject = field("subject");
        let unit = field("unit");

        if question.is_empty() || subject.is_empty() || unit.is_empty() {
            return Err(RequestError::MissingFields);
        }

        let history = fields.remove("history").unwrap_or(Value::Null);

        Ok(Self {
            subject,
            unit,
            question,
            history,
        })
    }
}

/// Loose scalar-to-string coercion used for request fields: strings pass
/// through, numbers print in decimal, `true` becomes "1", anything else "".
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => String::new(),
    }
}

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    /// Answer from the chat completions provider
    OpenAi,
    /// Canned demo answer, no credential configured
    Fallback,
}

/// Success envelope: `{"answer": ..., "source": "openai" | "fallback"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub source: AnswerSource,
}
