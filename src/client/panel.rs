// Chat panel state: conversation history, displayed bubbles and the
// submit control.
//
// Only one question may be in flight. While it is pending the input is
// disabled and further submits are rejected, never queued; finishing the
// request in any way re-enables it.

use serde_json::Value;
use thiserror::Error;

use super::http::{ClientError, TutorClient};
use crate::chat::{ChatMessage, ChatReply, ChatRequest};

pub const GREETING: &str = "学習中の内容に関して聞きたいことがあれば、メッセージを送ってください。";
pub const PENDING_TEXT: &str = "家庭教師が考えています…";
pub const EMPTY_ANSWER_TEXT: &str = "回答を取得できませんでした。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleKind {
    /// Notices, pending indicator and errors
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub kind: BubbleKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("a question is already being answered")]
    Busy,
}

/// Client-side state of one study page's chat sidebar.
#[derive(Debug, Clone)]
pub struct ChatPanel {
    subject: String,
    unit: String,
    conversation: Vec<ChatMessage>,
    bubbles: Vec<Bubble>,
    /// Question currently awaiting an answer, with its pending bubble index
    in_flight: Option<(String, usize)>,
}

impl ChatPanel {
    pub fn new(subject: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            unit: unit.into(),
            conversation: Vec::new(),
            bubbles: vec![Bubble {
                kind: BubbleKind::System,
                text: GREETING.to_string(),
            }],
            in_flight: None,
        }
    }

    /// Whether the input and submit button accept interaction.
    pub fn input_enabled(&self) -> bool {
        self.in_flight.is_none()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Completed turns, as sent back to the server as `history`.
    pub fn conversation(&self) -> &[ChatMessage] {
        &self.conversation
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// Start a submit: validate, disable input and build the request.
    ///
    /// The request carries the history as it was before this question.
    pub fn begin_submit(&mut self, question: &str) -> Result<ChatRequest, SubmitRejected> {
        if self.in_flight.is_some() {
            return Err(SubmitRejected::Busy);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(SubmitRejected::EmptyQuestion);
        }

        self.push_bubble(BubbleKind::User, question);
        let pending = self.push_bubble(BubbleKind::System, PENDING_TEXT);
        self.in_flight = Some((question.to_string(), pending));

        Ok(ChatRequest {
            subject: self.subject.clone(),
            unit: self.unit.clone(),
            question: question.to_string(),
            history: Value::Array(
                self.conversation
                    .iter()
                    .map(|m| serde_json::to_value(m).unwrap_or(Value::Null))
                    .collect(),
            ),
        })
    }

    /// Finish the in-flight submit with its outcome. Always re-enables input.
    ///
    /// On success the question and answer join the history; on failure
    /// the pending bubble turns into the error text and history is untouched.
    pub fn finish(&mut self, outcome: Result<ChatReply, ClientError>) {
        let Some((question, pending)) = self.in_flight.take() else {
            return;
        };

        let bubble = match outcome {
            Ok(reply) => {
                self.conversation.push(ChatMessage::user(question));
                if reply.answer.is_empty() {
                    Bubble {
                        kind: BubbleKind::Assistant,
                        text: EMPTY_ANSWER_TEXT.to_string(),
                    }
                } else {
                    self.conversation
                        .push(ChatMessage::assistant(reply.answer.clone()));
                    Bubble {
                        kind: BubbleKind::Assistant,
                        text: reply.answer,
                    }
                }
            }
            Err(e) => Bubble {
                kind: BubbleKind::System,
                text: e.to_string(),
            },
        };

        if let Some(slot) = self.bubbles.get_mut(pending) {
            *slot = bubble;
        }
    }

    /// Submit through `client`, holding the panel in the pending state for
    /// the duration of the call.
    pub async fn submit(
        &mut self,
        client: &TutorClient,
        question: &str,
    ) -> Result<(), SubmitRejected> {
        let request = self.begin_submit(question)?;
        let outcome = client.ask(&request).await;
        self.finish(outcome);
        Ok(())
    }

    fn push_bubble(&mut self, kind: BubbleKind, text: &str) -> usize {
        self.bubbles.push(Bubble {
            kind,
            text: text.to_string(),
        });
        self.bubbles.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::AnswerSource;
    use serde_json::json;

    fn reply(answer: &str) -> ChatReply {
        ChatReply {
            answer: answer.into(),
            source: AnswerSource::Fallback,
        }
    }

    #[test]
    fn test_input_disabled_while_pending_and_reenabled_on_success() {
        let mut panel = ChatPanel::new("math", "fractions");
        assert!(panel.input_enabled());

        let request = panel.begin_submit("1/2 + 1/3 は？").unwrap();
        assert_eq!(request.history, json!([]));
        assert!(!panel.input_enabled());
        assert_eq!(panel.bubbles().last().unwrap().text, PENDING_TEXT);

        panel.finish(Ok(reply("5/6")));
        assert!(panel.input_enabled());
        assert_eq!(
            panel.conversation(),
            &[ChatMessage::user("1/2 + 1/3 は？"), ChatMessage::assistant("5/6")]
        );
        assert_eq!(panel.bubbles().last().unwrap().kind, BubbleKind::Assistant);
    }

    #[test]
    fn test_second_submit_rejected_while_pending() {
        let mut panel = ChatPanel::new("math", "fractions");
        panel.begin_submit("first").unwrap();
        assert_eq!(panel.begin_submit("second"), Err(SubmitRejected::Busy));
        // Rejected submit leaves no trace
        assert_eq!(panel.bubbles().len(), 3);
    }

    #[test]
    fn test_reenabled_after_failures() {
        let failures = [
            ClientError::Network("connection refused".into()),
            ClientError::Server {
                status: 500,
                message: "家庭教師からの返信に失敗しました。".into(),
                details: None,
            },
            ClientError::Malformed("eof".into()),
        ];
        for failure in failures {
            let mut panel = ChatPanel::new("math", "fractions");
            panel.begin_submit("q").unwrap();
            panel.finish(Err(failure));
            assert!(panel.input_enabled());
            assert!(panel.conversation().is_empty());
            assert_eq!(panel.bubbles().last().unwrap().kind, BubbleKind::System);
        }
    }

    #[test]
    fn test_blank_question_rejected_without_disabling() {
        let mut panel = ChatPanel::new("math", "fractions");
        assert_eq!(panel.begin_submit("   "), Err(SubmitRejected::EmptyQuestion));
        assert!(panel.input_enabled());
    }

    #[test]
    fn test_history_sent_on_following_turn() {
        let mut panel = ChatPanel::new("math", "fractions");
        panel.begin_submit("q1").unwrap();
        panel.finish(Ok(reply("a1")));

        let request = panel.begin_submit("q2").unwrap();
        assert_eq!(
            request.history,
            json!([
                {"role": "user", "content": "q1"},
                {"role": "assistant", "content": "a1"}
            ])
        );
    }

    #[test]
    fn test_empty_answer_keeps_only_question() {
        let mut panel = ChatPanel::new("math", "fractions");
        panel.begin_submit("q").unwrap();
        panel.finish(Ok(reply("")));
        assert_eq!(panel.conversation(), &[ChatMessage::user("q")]);
        assert_eq!(panel.bubbles().last().unwrap().text, EMPTY_ANSWER_TEXT);
    }
}
