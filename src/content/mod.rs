// Subject/unit content: data model, read-only store and the context
// builder that turns a unit into the tutor's briefing text.

mod context;
mod store;
mod types;

pub use context::{build_context_text, html_to_text};
pub use store::{ContentError, ContentStore};
pub use types::{Exercise, Subject, Unit};
