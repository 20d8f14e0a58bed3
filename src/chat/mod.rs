// Chat request handling: request validation, conversation assembly and the
// offline fallback answer.

mod fallback;
mod messages;
mod request;

pub use fallback::fallback_answer;
pub use messages::{
    assemble_messages, parse_history, system_briefing, ChatMessage, Role, CONTEXT_DELIMITER,
    TUTOR_INSTRUCTIONS,
};
pub use request::{coerce_string, AnswerSource, ChatReply, ChatRequest, RequestError};
