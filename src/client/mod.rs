// Client side of the chat: HTTP client plus the UI state machines a front
// end drives (submit control re-entrancy and sidebar visibility).

mod http;
mod panel;
mod sidebar;

pub use http::{interpret_reply, ClientError, TutorClient, GENERIC_FAILURE, NETWORK_FAILURE};
pub use panel::{Bubble, BubbleKind, ChatPanel, SubmitRejected, GREETING, PENDING_TEXT};
pub use sidebar::{Layout, Sidebar, SidebarEvent, SidebarState};
