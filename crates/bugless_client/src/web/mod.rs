//! Browser bindings: DOM renderer, WebSocket transport, runtime and Leptos hook.

mod dom;
mod hooks;
mod runtime;
mod websocket;

pub use dom::{DomContainer, DomRenderer, NoteNode};
pub use hooks::{use_issue_query, IssueQueryState};
pub use runtime::BrowserRuntime;
pub use websocket::WebSocketStub;
