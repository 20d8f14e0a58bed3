// Chat completions wire types and answer extraction
//
// The response side is decoded as a raw Value first. Providers
// return `content` as a string, a list of parts, parts nesting more
// content, or nothing at all (with a `refusal` instead). We parse it into
// a small recursive enum and fold that into text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::ChatMessage;

/// Request body for `/v1/chat/completions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_completion_tokens: u32,
}

/// Extracted answer plus provider bookkeeping kept for the audit log.
#[derive(Debug, Clone)]
pub struct Completion {
    pub answer: String,
    pub id: Option<String>,
    pub usage: Option<Value>,
}

/// Message content as returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One element of a `Parts` list.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// A bare string or an object's `text` field, used verbatim
    Text(String),
    /// An object's `content` field, extracted recursively
    Nested(MessageContent),
}

impl MessageContent {
    /// Parse a `content` value. `None` for anything that cannot carry text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(MessageContent::Text(s.clone())),
            Value::Array(items) => Some(MessageContent::Parts(
                items.iter().filter_map(ContentPart::from_value).collect(),
            )),
            _ => None,
        }
    }

    /// Fold into text; `None` when the result is blank.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text(s) => Some(s.clone()),
                    ContentPart::Nested(inner) => inner.text(),
                })
                .collect(),
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

impl ContentPart {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ContentPart::Text(s.clone())),
            Value::Object(obj) => match obj.get("text") {
                Some(Value::String(text)) => Some(ContentPart::Text(text.clone())),
                _ => obj
                    .get("content")
                    .and_then(MessageContent::from_value)
                    .map(ContentPart::Nested),
            },
            _ => None,
        }
    }
}

/// Pull the answer out of a decoded chat completions response.
///
/// Choices are examined in order. Within a choice the message content wins;
/// failing that a non-blank `refusal` is returned (trimmed), since a
/// refusal is still something to show the student.
pub fn extract_answer(response: &Value) -> Option<String> {
    let choices = response.get("choices")?.as_array()?;

    choices.iter().find_map(|choice| {
        let message = choice.get("message")?.as_object()?;

        if let Some(text) = message
            .get("content")
            .and_then(MessageContent::from_value)
            .and_then(|content| content.text())
        {
            return Some(text);
        }

        message
            .get("refusal")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|refusal| !refusal.is_empty())
            .map(str::to_string)
    })
}
