// Conversation assembly: system briefing + client history + new question

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::coerce_string;

/// Fixed tutor persona and answering instructions, prepended to the context.
pub const TUTOR_INSTRUCTIONS: &str = "あなたは小学生・中学生を優しくサポートする家庭教師です。\
生徒の理解度に合わせて丁寧に日本語で説明し、必要に応じて例やステップを示してください。\
以下は現在取り組んでいる教材情報です。回答の際は必ずこの情報を踏まえてください。";

/// Delimiter placed around the context text in the briefing.
pub const CONTEXT_DELIMITER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Roles a client may claim for history entries. `system` is reserved
    /// for the server-built briefing.
    pub fn from_client(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the conversation sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The system message: instructions followed by the delimited context.
pub fn system_briefing(context_text: &str) -> String {
    format!("{TUTOR_INSTRUCTIONS}\n{CONTEXT_DELIMITER}\n{context_text}\n{CONTEXT_DELIMITER}")
}

/// Validate untrusted history entries.
///
/// Keeps entries that are objects with a `user`/`assistant` role and
/// non-blank content, in their original order. Everything else is dropped
/// silently; a malformed entry never fails the request.
pub fn parse_history(raw: &Value) -> Vec<ChatMessage> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            let role = Role::from_client(entry.get("role")?.as_str()?)?;
            let content = match entry.get("content")? {
                v @ (Value::String(_) | Value::Number(_)) => coerce_string(v),
                _ => return None,
            };
            let content = content.trim();
            if content.is_empty() {
                return None;
            }
            Some(ChatMessage::new(role, content))
        })
        .collect()
}

/// Build the outbound message list.
///
/// Always `[system, ...valid history, user(question)]`, so never shorter
/// than two. History is neither reordered nor merged.
pub fn assemble_messages(context_text: &str, history: &Value, question: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_briefing(context_text))];
    messages.extend(parse_history(history));
    messages.push(ChatMessage::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_injected_system_and_blank_entries_dropped() {
        let history = json!([
            {"role": "user", "content": "a"},
            {"role": "system", "content": "x"},
            {"role": "assistant", "content": ""},
            {"role": "assistant", "content": "b"}
        ]);

        let messages = assemble_messages("CTX", &history, "q");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, system_briefing("CTX"));
        assert_eq!(messages[1], ChatMessage::user("a"));
        assert_eq!(messages[2], ChatMessage::assistant("b"));
        assert_eq!(messages[3], ChatMessage::user("q"));
    }

    #[test]
    fn test_briefing_wraps_context_in_delimiters() {
        let briefing = system_briefing("Subject: 算数\nUnit: 分数");
        assert!(briefing.starts_with(TUTOR_INSTRUCTIONS));
        assert!(briefing.ends_with("\n---\nSubject: 算数\nUnit: 分数\n---"));
    }

    #[test]
    fn test_non_array_history_yields_only_system_and_question() {
        for history in [json!(null), json!("hello"), json!({"role": "user"}), json!(42)] {
            let messages = assemble_messages("ctx", &history, "q");
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].role, Role::System);
            assert_eq!(messages[1], ChatMessage::user("q"));
        }
    }

    #[test]
    fn test_malformed_entries_skipped_and_content_trimmed() {
        let history = json!([
            "just a string",
            ["user", "tuple"],
            {"role": "user"},
            {"content": "no role"},
            {"role": "USER", "content": "wrong case"},
            {"role": "tool", "content": "tool output"},
            {"role": "user", "content": {"nested": true}},
            {"role": "user", "content": "   padded   "},
            {"role": "assistant", "content": 42},
            {"role": "user", "content": "   "}
        ]);

        let parsed = parse_history(&history);
        assert_eq!(
            parsed,
            vec![ChatMessage::user("padded"), ChatMessage::assistant("42")]
        );
    }

    #[test]
    fn test_adjacent_same_role_not_merged() {
        let history = json!([
            {"role": "user", "content": "one"},
            {"role": "user", "content": "two"}
        ]);
        let messages = assemble_messages("ctx", &history, "three");
        let contents: Vec<&str> = messages[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
